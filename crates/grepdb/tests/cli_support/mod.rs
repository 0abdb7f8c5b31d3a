#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Schema of the two models every CLI test searches.
pub const MODELS: &str = r#"
[models.tests.TestModel]
fields = [
    { name = "text_field", kind = "TextField" },
    { name = "text_field_two", kind = "TextField" },
    { name = "char_field", kind = "CharField" },
]

[models.tests.TestModelTwo]
fields = [
    { name = "text_field", kind = "TextField" },
    { name = "char_field", kind = "CharField" },
    { name = "url", kind = "URLField" },
]
"#;

const TABLES: &[&str] = &[
    "CREATE TABLE tests_testmodel (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text_field TEXT NOT NULL DEFAULT '',
        text_field_two TEXT NOT NULL DEFAULT '',
        char_field VARCHAR(255) NOT NULL DEFAULT ''
    )",
    "CREATE TABLE tests_testmodeltwo (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text_field TEXT NOT NULL DEFAULT '',
        char_field VARCHAR(255) NOT NULL DEFAULT '',
        url VARCHAR(200) NOT NULL DEFAULT ''
    )",
];

pub fn grepdb_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_grepdb"))
}

/// A home directory with a config file and an empty test database.
pub struct TestEnv {
    pub home: TempDir,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
}

impl TestEnv {
    /// `extra_config` is appended after the database key and before the
    /// model declarations.
    pub fn new(extra_config: &str) -> Self {
        let home = TempDir::new().expect("create temp home");
        let config_path = home.path().join("config.toml");
        let db_path = home.path().join("app.sqlite3");

        let config = format!("database = \"app.sqlite3\"\n{}\n{}", extra_config, MODELS);
        fs::write(&config_path, config).expect("write config");

        let env = Self {
            home,
            config_path,
            db_path,
        };
        env.execute(TABLES);
        env
    }

    /// Run SQL statements against the test database.
    pub fn execute(&self, statements: &[&str]) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("build runtime");
        let url = format!("sqlite:{}?mode=rwc", self.db_path.display());
        rt.block_on(async {
            let pool = sqlx::SqlitePool::connect(&url).await.expect("connect");
            for sql in statements {
                sqlx::query(sql).execute(&pool).await.expect("execute seed sql");
            }
            pool.close().await;
        });
    }

    /// Insert one `tests_testmodel` row with only `text_field` set.
    pub fn insert_text(&self, text: &str) {
        let sql = format!(
            "INSERT INTO tests_testmodel (text_field) VALUES ('{}')",
            text.replace('\'', "''")
        );
        self.execute(&[sql.as_str()]);
    }

    pub fn run(&self, args: &[&str]) -> Output {
        run_cli(
            args,
            &[
                ("GREPDB_HOME", self.home.path().to_str().expect("utf-8 path")),
                ("GREPDB_CONFIG", self.config_path.to_str().expect("utf-8 path")),
            ],
        )
    }

    pub fn stdout(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert_cli_success(&output, args);
        String::from_utf8(output.stdout).expect("utf-8 stdout")
    }

    pub fn stderr_of_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert_cli_failure(&output, args);
        String::from_utf8_lossy(&output.stderr).into_owned()
    }
}

pub fn run_cli(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(grepdb_bin());
    cmd.args(args);
    cmd.env_remove("GREPDB_DATABASE");
    cmd.env_remove("NO_COLOR");
    cmd.env("RUST_LOG", "error");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("failed to execute grepdb CLI")
}

pub fn assert_cli_success(output: &Output, args: &[&str]) {
    assert!(
        output.status.success(),
        "command failed: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn assert_cli_failure(output: &Output, args: &[&str]) {
    assert!(
        !output.status.success(),
        "command unexpectedly succeeded: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Expected report for one field: heading plus `(label line, extra lines)`.
pub fn report(model: &str, field: &str, records: &[(&str, &str)]) -> String {
    let mut out = format!("\ntests.{} {}\n", model, field);
    for (record, rest) in records {
        out.push_str(record);
        out.push('\n');
        out.push_str(rest);
    }
    out
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}
