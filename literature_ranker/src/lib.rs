use error_chain::error_chain;
use std::env;

pub mod cache;
pub mod completed;
pub mod completion;
pub mod config;
pub mod expander;
pub mod fetcher;
pub mod model;
pub mod query;
pub mod relevance;
pub mod scorer;
pub mod semantic_scholar;
pub mod session;
pub mod tui;
pub mod walkthrough;

error_chain! {
    foreign_links {
        EnvVar(env::VarError);
        HttpRequest(reqwest::Error);
        IoError(std::io::Error);
        SerdeError(serde_json::Error);
    }

    errors {
        BadRequest(status: u16, body: String) {
            description("bad request")
            display("bad request ({}): {}", status, body)
        }
        UnexpectedStatus(status: u16, body: String) {
            description("unexpected response status")
            display("unexpected response status {}: {}", status, body)
        }
        MissingApiKey(variable: String) {
            description("missing api key")
            display("missing api key, set {}", variable)
        }
        InteractiveWithoutCompletedList {
            description("interactive mode requires a completed paper list")
            display("interactive mode requires --completed_paper_list")
        }
    }
}
