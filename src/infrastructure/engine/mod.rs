mod http_sql_validator;

pub use http_sql_validator::HttpSqlValidator;
