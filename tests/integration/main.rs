mod common;
mod health_test;
mod remote_submit_test;
