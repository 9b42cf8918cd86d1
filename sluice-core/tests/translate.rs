#[cfg(test)]
mod tests {
    use sluice_core::{
        Bindings, Engine, Error, Parameter, Params, SqlType, Value, count_placeholders,
        expand_bulk_values, params, translate,
    };
    use time::macros::date;

    const ENGINES: [Engine; 3] = [Engine::MySql, Engine::Postgres, Engine::Mssql];

    #[test]
    fn placeholder_count_preserved() {
        macro_rules! test_count {
            ($sql:literal, $params:expr, $native:literal) => {
                for engine in ENGINES {
                    let params: Params = $params;
                    let expected = params.len();
                    let query = translate($sql, params, engine.placeholder_style())
                        .expect("translation must succeed");
                    assert_eq!(query.bindings.len(), expected, "{engine}");
                    let native = match engine {
                        Engine::MySql => count_placeholders(&query.sql),
                        Engine::Postgres => query.sql.matches('$').count(),
                        Engine::Mssql => query.sql.matches("@param").count(),
                    };
                    assert_eq!(native, $native, "{engine}: {}", query.sql);
                }
            };
        }

        test_count!("SELECT 1", params![], 0);
        test_count!("SELECT * FROM t WHERE a = ?", params![1], 1);
        test_count!(
            "UPDATE t SET a = ?, b = ?, c = ? WHERE d = ?",
            params!["x", 2.5, true, None::<i32>],
            4
        );
        test_count!(
            "INSERT INTO t VALUES (?,?,?,?,?,?,?,?,?,?,?,?)",
            Params::Raw((0..12).map(Value::from).collect()),
            12
        );
    }

    #[test]
    fn positional_is_unchanged() {
        let sql = "SELECT * FROM users WHERE id = ? AND name = ?";
        let query = translate(sql, params![1, "a"], Engine::MySql.placeholder_style())
            .expect("translate");
        assert_eq!(query.sql, sql);
        assert_eq!(
            query.bindings,
            Bindings::Positional(vec![Value::Int64(1), Value::Varchar("a".into())])
        );
    }

    #[test]
    fn numbered() {
        let query = translate("a=? and b=?", params![1, 2], Engine::Postgres.placeholder_style())
            .expect("translate");
        assert_eq!(query.sql, "a=$1 and b=$2");

        let query = translate(
            "?,?,?,?,?,?,?,?,?,?,?",
            Params::Raw((0..11).map(Value::from).collect()),
            Engine::Postgres.placeholder_style(),
        )
        .expect("translate");
        assert_eq!(query.sql, "$1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11");
    }

    #[test]
    fn named() {
        let query = translate(
            "a=? and b=?",
            params!["x", date!(2024 - 01 - 31)],
            Engine::Mssql.placeholder_style(),
        )
        .expect("translate");
        assert_eq!(query.sql, "a=@param0 and b=@param1");
        let Bindings::Named(bindings) = &query.bindings else {
            panic!("named bindings expected");
        };
        let names: Vec<_> = bindings.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["param0", "param1"]);
        let first = query.bindings.get("param0").expect("param0");
        assert_eq!(first.sql_type, SqlType::Text);
        assert_eq!(first.value, Value::Varchar("x".into()));
        let second = query.bindings.get("param1").expect("param1");
        assert_eq!(second.sql_type, SqlType::DateTime);
        assert!(query.bindings.get("param2").is_none());
    }

    #[test]
    fn typed_parameters() {
        let params: Params = [
            Parameter::typed(SqlType::Decimal, 10),
            Parameter::typed(SqlType::Binary, vec![1u8, 2, 3]),
        ]
        .into();
        let query = translate("? + ?", params.clone(), Engine::Mssql.placeholder_style())
            .expect("translate");
        assert_eq!(
            query.bindings.get("param0").map(|b| b.sql_type),
            Some(SqlType::Decimal)
        );
        assert_eq!(
            query.bindings.get("param1").map(|b| b.sql_type),
            Some(SqlType::Binary)
        );

        let query = translate("? + ?", params, Engine::Postgres.placeholder_style())
            .expect("translate");
        assert_eq!(
            query.bindings,
            Bindings::Positional(vec![Value::Int64(10), Value::Blob([1, 2, 3].into())])
        );
    }

    #[test]
    fn surplus_is_truncated() {
        for engine in ENGINES {
            let query = translate("x = ?", params![1, 2, 3], engine.placeholder_style())
                .expect("surplus parameters are dropped");
            assert_eq!(query.bindings.len(), 1, "{engine}");
        }
    }

    #[test]
    fn missing_parameters() {
        for engine in ENGINES {
            let result = translate("x = ? AND y = ?", params![1], engine.placeholder_style());
            assert!(
                matches!(
                    result,
                    Err(Error::ParameterCount {
                        expected: 2,
                        actual: 1
                    })
                ),
                "{engine}: {result:?}"
            );
        }
    }

    #[test]
    fn question_mark_in_literal_is_a_placeholder() {
        let result = translate(
            "SELECT 'why?' FROM t WHERE id = ?",
            params![1],
            Engine::Postgres.placeholder_style(),
        );
        assert!(matches!(result, Err(Error::ParameterCount { .. })));
    }

    #[test]
    fn bulk() {
        let (sql, values) = expand_bulk_values(
            "INSERT INTO items (id, name) VALUES ?;",
            vec![
                vec![1.into(), "a".into()],
                vec![2.into(), "b".into()],
                vec![3.into(), "c".into()],
            ],
        )
        .expect("expand");
        assert_eq!(
            sql,
            "INSERT INTO items (id, name) VALUES (?, ?), (?, ?), (?, ?);"
        );
        assert_eq!(
            values,
            vec![
                Value::Int64(1),
                "a".into(),
                Value::Int64(2),
                "b".into(),
                Value::Int64(3),
                "c".into()
            ]
        );
        assert!(expand_bulk_values("INSERT INTO items VALUES ?", vec![]).is_err());
        assert!(expand_bulk_values("INSERT INTO items VALUES (1)", vec![vec![1.into()]]).is_err());
    }
}
