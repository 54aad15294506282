//! HTML Pages

use maud::{html, Markup, DOCTYPE};
use storage::PredictionRecord;
use survey_data::RatingField;

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/static/css/style.css";
            }
            body { (body) }
        }
    }
}

/// Rating form: one five-star question per survey field
pub fn index_page() -> Markup {
    layout(
        "Happiness Prediction",
        html! {
            h1 { "Find out how happy you are with your living situation" }
            form #ratings onsubmit="return false;" {
                @for field in RatingField::ALL {
                    fieldset .question id=(field.as_str()) {
                        legend { (field.question()) }
                        @for stars in 1..=5 {
                            input .star type="radio"
                                name=(field.as_str())
                                value=(stars)
                                id=(format!("{}-{}", field.as_str(), stars))
                                title=(format!("{} star(s)", stars));
                            label for=(format!("{}-{}", field.as_str(), stars)) { "★" }
                        }
                    }
                }
                button #button type="button" { "Submit your ratings" }
            }
            p { a href="/measurements" { "Saved measurements" } }
            script src="/static/js/script.js" {}
        },
    )
}

/// Table of every stored prediction
pub fn measurements_page(records: &[PredictionRecord]) -> Markup {
    layout(
        "Saved Measurements",
        html! {
            h1 { "Saved Measurements" }
            @if records.is_empty() {
                p { "No measurements saved yet." }
            } @else {
                table {
                    thead {
                        tr {
                            th { "ID" }
                            @for field in RatingField::ALL {
                                th { (field.as_str()) }
                            }
                            th { "Prediction" }
                            th { "Probability" }
                        }
                    }
                    tbody {
                        @for record in records {
                            tr {
                                td { (record.id) }
                                @for value in record.measurement().features() {
                                    td { (value) }
                                }
                                td { (record.prediction) }
                                td { (format!("{:.2}", record.probability)) }
                            }
                        }
                    }
                }
            }
            p { a href="/" { "Back to the survey" } }
        },
    )
}
