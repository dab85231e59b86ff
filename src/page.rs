use crate::models::{Verdict, MARKET_SEGMENTS, MEAL_PLANS, ROOM_TYPES};

pub const CONFIRMED_TEXT: &str = "Great! Your booking looks confirmed.";
pub const CANCELED_TEXT: &str = "Sorry, this booking looks like it might be canceled.";

/// What the result block shows under the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Prediction(Verdict),
    Failure(String),
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Hotel Booking Prediction</title>
    <style>
        body {
            font-family: 'Segoe UI', Tahoma, sans-serif;
            background: linear-gradient(135deg, #1d976c, #93f9b9);
            margin: 0; padding: 0;
        }
        .container {
            width: 600px;
            margin: 60px auto;
            background: #fff;
            border-radius: 12px;
            padding: 30px;
            box-shadow: 0 8px 25px rgba(0,0,0,0.25);
        }
        h2 { text-align: center; color: #1d976c; margin-bottom: 20px; }
        form label { display: block; margin-top: 12px; font-weight: bold; color: #333; }
        form input, form select {
            width: 100%;
            padding: 10px;
            margin-top: 5px;
            border-radius: 6px;
            border: 1px solid #ccc;
            font-size: 14px;
        }
        button {
            width: 100%;
            padding: 12px;
            margin-top: 20px;
            background: #1d976c;
            border: none;
            border-radius: 6px;
            color: #fff;
            font-size: 16px;
            cursor: pointer;
            transition: 0.3s;
        }
        button:hover { background: #158a5b; }
        .result {
            margin-top: 25px;
            padding: 20px;
            border-radius: 8px;
            font-size: 20px;
            text-align: center;
            font-weight: bold;
        }
        .confirmed { background: #e6ffed; border-left: 8px solid #28a745; color: #155724; }
        .canceled { background: #ffe6e6; border-left: 8px solid #dc3545; color: #721c24; }
    </style>
</head>
<body>
    <div class="container">
        <h2>Hotel Booking Prediction</h2>
        <form method="POST">
"#;

const TAIL: &str = "    </div>\n</body>\n</html>\n";

enum Input {
    Number,
    Decimal,
    Date,
    Category(&'static [&'static str]),
    Choice(&'static [(&'static str, &'static str)]),
}

const FIELDS: [(&str, &str, Input); 15] = [
    ("Number of Adults", "number_of_adults", Input::Number),
    ("Number of Children", "number_of_children", Input::Number),
    ("Weekend Nights", "number_of_weekend_nights", Input::Number),
    ("Week Nights", "number_of_week_nights", Input::Number),
    ("Type of Meal", "type_of_meal", Input::Category(&MEAL_PLANS)),
    ("Car Parking Space", "car_parking_space", Input::Number),
    ("Room Type", "room_type", Input::Category(&ROOM_TYPES)),
    ("Lead Time", "lead_time", Input::Number),
    ("Market Segment", "market_segment_type", Input::Category(&MARKET_SEGMENTS)),
    ("Repeated Guest", "repeated", Input::Choice(&[("0", "No"), ("1", "Yes")])),
    ("P-C", "P_C", Input::Number),
    ("P-not-C", "P_not_C", Input::Number),
    ("Average Price", "average_price", Input::Decimal),
    ("Special Requests", "special_requests", Input::Number),
    ("Date of Reservation", "date_of_reservation", Input::Date),
];

/// Renders the booking form, with a result block when `outcome` is set.
pub fn render(outcome: Option<&Outcome>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str(HEAD);

    for (label, name, input) in &FIELDS {
        html.push_str(&format!("            <label>{label}:</label>\n"));
        match input {
            Input::Number => html.push_str(&format!(
                "            <input type=\"number\" name=\"{name}\" required>\n"
            )),
            Input::Decimal => html.push_str(&format!(
                "            <input type=\"number\" step=\"0.01\" name=\"{name}\" required>\n"
            )),
            Input::Date => html.push_str(&format!(
                "            <input type=\"date\" name=\"{name}\" required>\n"
            )),
            Input::Category(choices) => {
                let options: Vec<_> = choices.iter().map(|c| (*c, *c)).collect();
                html.push_str(&select(name, &options));
            }
            Input::Choice(pairs) => html.push_str(&select(name, pairs)),
        }
        html.push('\n');
    }
    html.push_str("            <button type=\"submit\">Predict</button>\n        </form>\n");

    if let Some(outcome) = outcome {
        let (class, text) = result_block(outcome);
        html.push_str(&format!(
            "\n        <div class=\"result {class}\">\n            {text}\n        </div>\n"
        ));
    }

    html.push_str(TAIL);
    html
}

fn select(name: &str, options: &[(&str, &str)]) -> String {
    let mut out = format!("            <select name=\"{name}\">\n");
    for (value, text) in options {
        out.push_str(&format!(
            "                <option value=\"{value}\">{text}</option>\n"
        ));
    }
    out.push_str("            </select>\n");
    out
}

fn result_block(outcome: &Outcome) -> (&'static str, String) {
    match outcome {
        Outcome::Prediction(Verdict::NotCanceled) => ("confirmed", CONFIRMED_TEXT.to_string()),
        Outcome::Prediction(Verdict::Canceled) => ("canceled", CANCELED_TEXT.to_string()),
        Outcome::Prediction(Verdict::Unrecognized(raw)) => ("canceled", escape(raw)),
        Outcome::Failure(message) => ("canceled", escape(&format!("Error: {message}"))),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
