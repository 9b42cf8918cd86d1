use crate::{RowWrap, ValueWrap, procedure_call};
use mysql_async::{
    Conn, Params, QueryResult,
    prelude::{Protocol, Queryable},
};
use sluice_core::{
    Connection, Error, NativeResult, Parameter, ProcedureResult, Result,
    TranslatedQuery, Value, async_trait, truncate_long,
};

pub struct MySqlConnection {
    pub(crate) conn: Conn,
    pub(crate) multiple_statements: bool,
}

impl MySqlConnection {
    async fn run(&mut self, sql: &str, values: Vec<Value>) -> mysql_async::Result<NativeResult> {
        if values.is_empty() {
            collect(self.conn.query_iter(sql).await?).await
        } else {
            let params = Params::Positional(values.into_iter().map(|v| ValueWrap(v).into()).collect());
            collect(self.conn.exec_iter(sql, params).await?).await
        }
    }
}

/// Reads every result set, sets without columns only contribute the affected rows.
async fn collect<P: Protocol>(mut result: QueryResult<'_, 'static, P>) -> mysql_async::Result<NativeResult> {
    let mut native = NativeResult::default();
    while !result.is_empty() {
        let has_columns = result.columns().is_some_and(|v| !v.is_empty());
        let rows: Vec<RowWrap> = result.collect().await?;
        native.rows_affected += result.affected_rows();
        if let Some(id) = result.last_insert_id() {
            native.last_insert_id = Some(id);
        }
        if has_columns {
            native.result_sets.push(rows.into_iter().map(|v| v.0).collect());
        }
    }
    Ok(native)
}

enum Token<'s> {
    Word(&'s str),
    Semicolon,
    Other,
}

fn skip_line(sql: &str, i: usize) -> usize {
    sql[i..].find('\n').map_or(sql.len(), |v| i + v + 1)
}

/// Splits the text into words and `;`, literals count as a single token and comments are dropped.
fn tokens(sql: &str) -> Vec<Token<'_>> {
    let bytes = sql.as_bytes();
    let is_word = |c: u8| c.is_ascii_alphanumeric() || c == b'_' || c == b'$';
    let mut result = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' if quote != b'`' => i += 2,
                        c if c == quote => {
                            i += 1;
                            if bytes.get(i) != Some(&quote) {
                                break;
                            }
                            i += 1;
                        }
                        _ => i += 1,
                    }
                }
                result.push(Token::Other);
            }
            b'#' => i = skip_line(sql, i),
            b'-' if bytes.get(i + 1) == Some(&b'-')
                && bytes.get(i + 2).is_none_or(|v| v.is_ascii_whitespace()) =>
            {
                i = skip_line(sql, i)
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = sql[i + 2..].find("*/").map_or(sql.len(), |v| i + v + 4)
            }
            b';' => {
                result.push(Token::Semicolon);
                i += 1;
            }
            c if is_word(c) => {
                let start = i;
                while i < bytes.len() && is_word(bytes[i]) {
                    i += 1;
                }
                result.push(Token::Word(&sql[start..i]));
            }
            c if c.is_ascii_whitespace() => i += 1,
            _ => {
                result.push(Token::Other);
                i += 1;
            }
        }
    }
    result
}

/// Number of statements in the text.
///
/// Inside a `CREATE` statement, semicolons between `BEGIN` (or `CASE`) and its `END` belong to the
/// routine body.
fn statements_count(sql: &str) -> usize {
    let keyword = |word: &str, v: &str| word.eq_ignore_ascii_case(v);
    let tokens = tokens(sql);
    let mut tokens = tokens.iter().peekable();
    let mut count = 0;
    let mut pending = false;
    let mut routine = false;
    let mut depth = 0usize;
    while let Some(token) = tokens.next() {
        match token {
            Token::Semicolon if depth == 0 => {
                count += usize::from(pending);
                pending = false;
                routine = false;
            }
            Token::Semicolon => {}
            Token::Word(word) => {
                if !pending {
                    routine = keyword(word, "CREATE");
                }
                pending = true;
                if !routine {
                    continue;
                }
                if keyword(word, "BEGIN") || keyword(word, "CASE") {
                    depth += 1;
                } else if keyword(word, "END") {
                    match tokens.peek() {
                        Some(Token::Word(next))
                            if ["IF", "LOOP", "WHILE", "REPEAT"]
                                .iter()
                                .any(|v| keyword(next, v)) =>
                        {
                            tokens.next();
                        }
                        Some(Token::Word(next)) if keyword(next, "CASE") => {
                            tokens.next();
                            depth = depth.saturating_sub(1);
                        }
                        _ => depth = depth.saturating_sub(1),
                    }
                }
            }
            Token::Other => pending = true,
        }
    }
    count + usize::from(pending)
}

fn wrap_error(error: mysql_async::Error, context: String) -> Error {
    let error = Error::native(error, context);
    log::error!("{:#}", error);
    error
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn execute(&mut self, query: TranslatedQuery) -> Result<NativeResult> {
        let values = query.bindings.into_values();
        if values.is_empty() && !self.multiple_statements && statements_count(&query.sql) > 1 {
            return Err(Error::Unsupported(
                "multiple statements are disabled, enable `multiple_statements`".into(),
            ));
        }
        self.run(&query.sql, values).await.map_err(|e| {
            wrap_error(
                e,
                format!("While running the query:\n{}", truncate_long!(query.sql)),
            )
        })
    }

    async fn begin(&mut self) -> Result<()> {
        self.conn
            .query_drop("START TRANSACTION")
            .await
            .map_err(|e| wrap_error(e, "While starting the transaction".into()))
    }

    async fn commit(&mut self) -> Result<()> {
        self.conn
            .query_drop("COMMIT")
            .await
            .map_err(|e| wrap_error(e, "While committing the transaction".into()))
    }

    async fn rollback(&mut self) -> Result<()> {
        self.conn
            .query_drop("ROLLBACK")
            .await
            .map_err(|e| wrap_error(e, "While rolling back the transaction".into()))
    }

    async fn call_procedure(
        &mut self,
        name: &str,
        parameters: &[Parameter],
    ) -> Result<ProcedureResult> {
        let call = procedure_call(name, parameters);
        let context = || format!("While calling the procedure `{name}`");
        for (sql, value) in call.setup {
            self.conn
                .exec_drop(sql, Params::Positional(vec![ValueWrap(value).into()]))
                .await
                .map_err(|e| wrap_error(e, context()))?;
        }
        let native = self
            .run(&call.call, call.inputs)
            .await
            .map_err(|e| wrap_error(e, context()))?;
        let mut result = ProcedureResult {
            result_sets: native.result_sets,
            ..Default::default()
        };
        if let Some(select) = call.outputs {
            let outputs = self
                .run(&select, Vec::new())
                .await
                .map_err(|e| wrap_error(e, context()))?;
            if let Some(row) = outputs.result_sets.into_iter().flatten().next() {
                result.output = row
                    .labels
                    .iter()
                    .cloned()
                    .zip(row.values.into_vec())
                    .collect();
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::statements_count;

    #[test]
    fn count() {
        assert_eq!(statements_count(""), 0);
        assert_eq!(statements_count("SELECT 1"), 1);
        assert_eq!(statements_count("SELECT 1;"), 1);
        assert_eq!(statements_count("SELECT 1; SELECT 2"), 2);
        assert_eq!(
            statements_count("CREATE PROCEDURE p() BEGIN SELECT 1; SELECT 2; END"),
            1
        );
    }

    #[test]
    fn semicolons_in_literals_and_comments() {
        assert_eq!(
            statements_count("INSERT INTO t (name) VALUES ('a;b')"),
            1
        );
        assert_eq!(
            statements_count("SELECT 'it''s;', \"x;\", `a;b` FROM t"),
            1
        );
        assert_eq!(statements_count("SELECT 'a\\';b'"), 1);
        assert_eq!(statements_count("SELECT /* ; */ 1"), 1);
        assert_eq!(statements_count("SELECT 1; -- trailing; comment"), 1);
        assert_eq!(statements_count("SELECT 1 # ; \nFROM t"), 1);
    }

    #[test]
    fn create_statements() {
        assert_eq!(
            statements_count("CREATE TABLE a (id INT); DROP TABLE b"),
            2
        );
        assert_eq!(
            statements_count(
                "CREATE PROCEDURE p() BEGIN IF x THEN SELECT 1; END IF; \
                SELECT CASE WHEN y THEN 1 END; END; SELECT 2"
            ),
            2
        );
        assert_eq!(
            statements_count(
                "CREATE TRIGGER t BEFORE INSERT ON a FOR EACH ROW BEGIN \
                SET NEW.id = 1; END; INSERT INTO a VALUES (1)"
            ),
            2
        );
    }
}
