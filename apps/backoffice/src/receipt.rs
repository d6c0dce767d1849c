//! # Receipt
//!
//! Printable HTML receipt for the till. The page is self-contained (inline
//! style, no scripts) so it can be written to a print window as is.
//!
//! ```text
//!        SIMPLY COSMÉTICOS
//! Data: 14:32:05 - 18/10/2026
//! Atendente: Joana Lima
//! Forma de Pagamento: PIX
//!
//! Batom Matte x2            R$ 59,80
//! Base Líquida x1           R$ 59,90
//! - - - - - - - - - - - - - - - - - -
//! Total: R$ 119,70
//!
//!    Obrigado pela preferência!
//! ```

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, Utc};
use simply_core::formatters::{format_currency, format_date, format_time, payment_method_label};
use simply_core::{Cart, CoreError, CoreResult, PaymentMethod, User};

const STYLE: &str = "\
body { font-family: monospace; font-size: 12px; }
h2 { text-align: center; margin-bottom: 10px; }
.items { margin-top: 10px; }
.item { display: flex; justify-content: space-between; margin-bottom: 4px; }
.total { border-top: 1px dashed #000; margin-top: 10px; padding-top: 5px; font-weight: bold; }";

/// Renders the receipt for the lines in `cart`.
///
/// `user` is the operator; without one the receipt reads `N/A`.
pub fn render_receipt(
    store_name: &str,
    cart: &Cart,
    payment_method: PaymentMethod,
    user: Option<&User>,
    at: DateTime<Utc>,
    offset: FixedOffset,
) -> CoreResult<String> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let operator = user.map(User::display_name).unwrap_or("N/A");

    let mut html = String::with_capacity(1024);
    html.push_str("<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Comprovante - Simply Cosméticos</title>\n");
    let _ = writeln!(html, "<style>\n{}\n</style>", STYLE);
    html.push_str("</head>\n<body>\n");

    let _ = writeln!(html, "<h2>{}</h2>", escape_html(store_name));
    let _ = writeln!(
        html,
        "<p><strong>Data:</strong> {} - {}</p>",
        format_time(at, offset),
        format_date(at, offset)
    );
    let _ = writeln!(
        html,
        "<p><strong>Atendente:</strong> {}</p>",
        escape_html(operator)
    );
    let _ = writeln!(
        html,
        "<p><strong>Forma de Pagamento:</strong> {}</p>",
        payment_method_label(payment_method)
    );

    html.push_str("<div class=\"items\">\n");
    for item in cart.items() {
        let _ = writeln!(
            html,
            "<div class=\"item\"><span>{} x{}</span><span>{}</span></div>",
            escape_html(&item.name),
            item.quantity,
            format_currency(item.line_total())
        );
    }
    html.push_str("</div>\n");

    let _ = writeln!(
        html,
        "<div class=\"total\"><div>Total: {}</div></div>",
        format_currency(cart.subtotal())
    );
    html.push_str("<p style=\"text-align:center; margin-top:10px;\">Obrigado pela preferência!</p>\n");
    html.push_str("</body>\n</html>\n");

    Ok(html)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
