//! HTML rendering of the daily birthday notification.
//!
//! Produces the email body: a styled document with the today-view table and
//! a templated birthday message.  Message composition is a fixed template —
//! no generative service is involved.

use bfinder_query::TodayRow;

/// Subject line of the daily notification.
pub const SUBJECT: &str = "Birthday Finder Notification";

/// Escape a string for safe inclusion in HTML text content.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Templated birthday message naming every celebrant, signed by
/// `sender_name`.
pub fn birthday_message(rows: &[TodayRow], sender_name: &str) -> String {
    let celebrants = rows
        .iter()
        .map(|row| format!("{} (turning {})", row.name, row.age))
        .collect::<Vec<_>>()
        .join(" and ");

    format!(
        "Happy birthday to {celebrants}! Wishing you a wonderful day and a \
         fantastic year ahead, full of good health, success, and celebration. \
         Enjoy every moment of it.\n\nWarm regards,\n{sender_name}"
    )
}

/// Render the today view as an HTML table.
pub fn render_table(rows: &[TodayRow]) -> String {
    let mut html = String::from("<table class=\"birthday-table\">\n  <tr>");
    for column in TodayRow::COLUMNS {
        html.push_str(&format!("<th>{}</th>", html_escape(column)));
    }
    html.push_str("</tr>\n");

    for row in rows {
        html.push_str("  <tr>");
        for value in row.values() {
            html.push_str(&format!("<td>{}</td>", html_escape(&value)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</table>");
    html
}

/// Render the complete email document for today's celebrations.
pub fn render_email(rows: &[TodayRow], sender_name: &str) -> String {
    let table = render_table(rows);
    let message = html_escape(&birthday_message(rows, sender_name)).replace('\n', "<br>");

    format!(
        r#"<html>
<head>
    <meta charset="UTF-8">
    <title>Birthday Celebration Notification</title>
    <style>
        body {{
            font-family: 'Helvetica Neue', Helvetica, Arial, sans-serif;
            background: linear-gradient(135deg, #E0EAFC, #CFDEF3);
            margin: 0;
            padding: 20px;
        }}
        .container {{
            max-width: 650px;
            margin: auto;
            background: #ffffff;
            border-radius: 10px;
            box-shadow: 0 8px 20px rgba(0, 0, 0, 0.1);
            overflow: hidden;
        }}
        .header {{
            background: linear-gradient(135deg, #667eea, #764ba2);
            color: #fff;
            text-align: center;
            padding: 40px 20px;
        }}
        .content {{
            padding: 30px;
        }}
        .table-container {{
            overflow-x: auto;
            margin-bottom: 30px;
        }}
        .birthday-table {{
            width: 100%;
            border-collapse: collapse;
            min-width: 900px;
        }}
        .birthday-table th, .birthday-table td {{
            border: 1px solid #ccc;
            padding: 12px;
            text-align: center;
        }}
        .birthday-table th {{
            background-color: #f7f7f7;
            font-weight: bold;
        }}
        .message {{
            background-color: #e8f4fd;
            border-left: 6px solid #3498db;
            padding: 20px;
            border-radius: 5px;
            font-size: 18px;
            line-height: 1.6;
            color: #2c3e50;
        }}
        .footer {{
            background-color: #f7f7f7;
            text-align: center;
            padding: 20px;
            font-size: 14px;
            color: #777;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Birthday Celebration Notification</h1>
        </div>
        <div class="content">
            <h2>Today's Birthday Celebrations</h2>
            <div class="table-container">
                {table}
            </div>
            <h2>Birthday Wishes</h2>
            <div class="message">
                {message}
            </div>
        </div>
        <div class="footer">
            This email and its contents are intended solely for the designated
            recipient. If you have received this email in error, please notify
            the sender and delete it.
        </div>
    </div>
</body>
</html>
"#
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> TodayRow {
        TodayRow {
            name: "Ananya Sharma".into(),
            dob: "15-03-1990".into(),
            age: 34,
            section: "A".into(),
            contact: "9876543210".into(),
            roll_no: "042".into(),
            registration_no: "2021000042".into(),
            gender: "Female".into(),
            residency: "Hosteller".into(),
            email: "ananya@example.com".into(),
        }
    }

    #[test]
    fn table_contains_every_column_and_value() {
        let row = sample_row();
        let html = render_table(std::slice::from_ref(&row));

        for column in TodayRow::COLUMNS {
            assert!(html.contains(&html_escape(column)), "missing {column}");
        }
        for value in row.values() {
            assert!(html.contains(&html_escape(&value)), "missing {value}");
        }
    }

    #[test]
    fn message_names_every_celebrant_and_sender() {
        let mut second = sample_row();
        second.name = "Rahul Verma".into();
        second.age = 24;

        let message = birthday_message(&[sample_row(), second], "The Registrar");
        assert!(message.contains("Ananya Sharma (turning 34)"));
        assert!(message.contains("Rahul Verma (turning 24)"));
        assert!(message.ends_with("The Registrar"));
    }

    #[test]
    fn html_is_escaped() {
        let mut row = sample_row();
        row.name = "Evil <script>".into();
        let html = render_table(&[row]);
        assert!(html.contains("Evil &lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn full_document_embeds_table_and_message() {
        let html = render_email(&[sample_row()], "The Registrar");
        assert!(html.contains("birthday-table"));
        assert!(html.contains("Ananya Sharma"));
        assert!(html.contains("Birthday Wishes"));
    }
}
