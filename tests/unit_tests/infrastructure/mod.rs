mod stub_server;

mod http_sql_validator_test;
mod keyword_question_interpreter_test;
