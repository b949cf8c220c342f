mod common;

mod auth_tests;
mod course_tests;
mod upload_tests;
