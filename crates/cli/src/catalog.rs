//! Built-in route catalog of the analytics product, used by `tabulactl routes`.

use tabula_search::Command;

fn route(key: &str, path: &str, title: &str, description: &str, keywords: &str) -> Command {
    Command {
        key: key.to_string(),
        path: path.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        keywords: keywords.to_string(),
        authority: Vec::new(),
    }
}

pub fn routes() -> Vec<Command> {
    vec![
        route(
            "home",
            "/home",
            "Home",
            "Explore what the platform has to offer.",
            "main dashboard overview welcome starting page landing",
        ),
        route(
            "settings",
            "/settings",
            "Settings",
            "Manage account preferences, profile and security.",
            "config password profile user account preferences edit update",
        ),
        route(
            "dashboard",
            "/dashboard",
            "Registration Intelligence",
            "Analyse new car registration trends with the SARIMA forecasting engine.",
            "car vehicle registration coe trends sarima forecast prediction analytics data visualisation automotive stats chart export pdf csv",
        ),
        route(
            "report",
            "/dashboard/report",
            "Executive Summaries",
            "Turn time-series data into readable stakeholder reports with trend interpretation.",
            "summary analytics stakeholder download pdf export analysis insights reporting time-series interpretation data",
        ),
        route(
            "chatbot",
            "/chatbot",
            "Market Query API",
            "Ask natural language questions about registration metrics and seasonal fluctuations.",
            "ai assistant chat help llm chatbot support ask questions metrics natural language bot prompt",
        ),
        route(
            "detection",
            "/detection",
            "Vision Inspection",
            "Neural network for vehicle classification and structural damage assessment.",
            "cv computer vision damage vehicle car crash detection neural network deep learning images photo inspection",
        ),
    ]
}
