pub mod question_request;
pub mod question_route;
