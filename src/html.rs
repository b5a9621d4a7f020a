//! Shared layout, styles and formatting helpers for the HTML views.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_SECONDARY_STYLE: &str = "py-2 px-3 text-sm font-medium \
    text-gray-900 bg-white rounded border border-gray-200 \
    hover:bg-gray-100 hover:text-blue-700 focus:z-10 dark:bg-gray-800 \
    dark:text-gray-400 dark:border-gray-600 dark:hover:text-white \
    dark:hover:bg-gray-700";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

pub const BUTTON_CONFIRM_STYLE: &str = "text-green-700 hover:text-green-600 \
    dark:text-green-500 dark:hover:text-green-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Card and collapsible group styles
pub const CARD_STYLE: &str = "w-full rounded-lg border border-gray-200 bg-white p-4 \
    shadow-sm dark:border-gray-700 dark:bg-gray-800";

pub const GROUP_STYLE: &str = "rounded border border-gray-200 dark:border-gray-700";

pub const GROUP_SUMMARY_STYLE: &str = "flex cursor-pointer select-none items-center \
    justify-between gap-4 px-4 py-3 text-sm";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Bankroll" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900 pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                // Alert container for error and success fragments
                div
                    id="alert-container"
                    class="w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-blue-600
                            hover:bg-blue-800 focus:ring-4 focus:outline-hidden
                            focus:ring-blue-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-blue-900 my-4"
                    {
                        "Back to Homepage"
                    }
                }
            }
        }
    );

    base(title, &[], &content)
}

/// The banner shown at the top of a page when its data could not be loaded.
pub fn error_banner(message: &str) -> Markup {
    html!(
        div
            class="w-full max-w-5xl rounded-lg border border-red-300 bg-red-50 px-4 py-3
                text-sm text-red-800 dark:border-red-800 dark:bg-gray-800 dark:text-red-300"
            role="alert"
            data-error-banner="true"
        {
            "Error: " (message)
        }
    )
}

/// A page that only shows the navigation bar, the heading and an error banner.
///
/// Pages render this when one of their reads fails.
pub fn load_error_page(title: &str, nav_bar: Markup, refresh_url: &str, message: &str) -> Markup {
    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                (page_header(title, refresh_url))
                (error_banner(message))
            }
        }
    );

    base(title, &[], &content)
}

/// An option of a `<select>`: the submitted value and the visible label.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl ToString, label: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            label: label.into(),
        }
    }
}

/// Sort options by label, the order every picker shows them in.
pub fn sorted_by_label(mut options: Vec<SelectOption>) -> Vec<SelectOption> {
    options.sort_by(|a, b| a.label.cmp(&b.label));
    options
}

/// A labelled, required `<select>` with an empty placeholder option.
pub fn select_field(
    label: &str,
    name: &str,
    options: &[SelectOption],
    selected: Option<&str>,
) -> Markup {
    html!(
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            select id=(name) name=(name) required class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Choose..." }

                @for choice in options {
                    option
                        value=(choice.value)
                        selected[selected == Some(choice.value.as_str())]
                    {
                        (choice.label)
                    }
                }
            }
        }
    )
}

/// The page heading with a link that reloads the page.
pub fn page_header(title: &str, refresh_url: &str) -> Markup {
    html!(
        header class="flex w-full max-w-5xl items-end justify-between gap-3"
        {
            h1 class="text-xl font-bold" { (title) }

            a href=(refresh_url) class=(BUTTON_SECONDARY_STYLE) { "Refresh" }
        }
    )
}

pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("€")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-€")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    let number = round_to_cents(number);

    let mut formatted_string = if number == 0.0 {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "€0.00".to_owned()
    } else if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else {
        positive_fmt.fmt_string(number)
    };

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    match formatted_string.rfind('.') {
        Some(point) if formatted_string.len() - point == 2 => formatted_string.push('0'),
        None => formatted_string.push_str(".00"),
        _ => {}
    }

    formatted_string
}

/// `number` rounded to whole cents, with anything that rounds to zero or is not finite as 0.0.
///
/// numfmt switches to scientific notation below one cent, so amounts must be
/// rounded before they are formatted.
fn round_to_cents(number: f64) -> f64 {
    let cents = (number * 100.0).round();

    if cents.is_finite() && cents != 0.0 {
        cents / 100.0
    } else {
        0.0
    }
}

/// Format `number` as currency with an explicit "+" for positive amounts.
pub fn format_signed_currency(number: f64) -> String {
    if round_to_cents(number) > 0.0 {
        format!("+{}", format_currency(number))
    } else {
        format_currency(number)
    }
}

/// Format a ratio in [0, 1] as a percentage with two decimals.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

pub fn is_zero(number: f64) -> bool {
    number.abs() < 1e-9
}

/// Text colour for a balance: grey for zero, green for positive, red for negative.
pub fn balance_class(number: f64) -> &'static str {
    if is_zero(number) {
        "text-gray-400 dark:text-gray-500"
    } else if number > 0.0 {
        "text-green-700 dark:text-green-400"
    } else {
        "text-red-700 dark:text-red-400"
    }
}

/// Text colour for money in transit: grey for zero, amber otherwise.
pub fn pending_class(number: f64) -> &'static str {
    if is_zero(number) {
        "text-gray-400 dark:text-gray-500"
    } else {
        "text-amber-600 dark:text-amber-400"
    }
}

/// A group total coloured by sign, e.g. "+€12.00".
pub fn signed_total_view(total: f64) -> Markup {
    html!(
        span class={ "font-semibold " (balance_class(total)) } { (format_signed_currency(total)) }
    )
}

/// A button that sends a DELETE request after asking the user to confirm.
///
/// On success the server redirects, on failure the alert is shown in the
/// alert container.
pub fn delete_button(delete_url: &str, confirm_message: &str) -> Markup {
    html!(
        button
            type="button"
            hx-delete=(delete_url)
            hx-confirm=(confirm_message)
            hx-target-error="#alert-container"
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    )
}

#[cfg(test)]
mod tests {
    use super::{balance_class, format_currency, format_percent, format_signed_currency};

    #[test]
    fn zero_is_formatted_with_two_decimals() {
        assert_eq!(format_currency(0.0), "€0.00");
        assert_eq!(format_currency(-0.0), "€0.00");
        assert_eq!(format_currency(f64::NAN), "€0.00");
    }

    #[test]
    fn sub_cent_amounts_round_to_cents() {
        assert_eq!(format_currency(0.004), "€0.00");
        assert_eq!(format_currency(0.001), "€0.00");
        assert_eq!(format_currency(-0.004), "€0.00");
        assert_eq!(format_currency(0.006), "€0.01");
        assert_eq!(format_currency(-0.006), "-€0.01");
        assert_eq!(format_signed_currency(0.004), "€0.00");
    }

    #[test]
    fn whole_and_tenth_amounts_have_two_decimals() {
        assert_eq!(format_currency(12.0), "€12.00");
        assert_eq!(format_currency(0.5), "€0.50");
        assert_eq!(format_currency(-3.0), "-€3.00");
    }

    #[test]
    fn negative_amounts_have_minus_before_symbol() {
        assert!(format_currency(-12.5).starts_with("-€"));
    }

    #[test]
    fn signed_currency_adds_plus_for_gains_only() {
        assert!(format_signed_currency(10.0).starts_with("+€"));
        assert!(format_signed_currency(-10.0).starts_with("-€"));
        assert_eq!(format_signed_currency(0.0), "€0.00");
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(format_percent(0.6), "60.00%");
        assert_eq!(format_percent(1.0 / 3.0), "33.33%");
    }

    #[test]
    fn balance_class_distinguishes_sign() {
        assert_ne!(balance_class(1.0), balance_class(-1.0));
        assert_ne!(balance_class(0.0), balance_class(1.0));
        assert_eq!(balance_class(1e-12), balance_class(0.0));
    }
}
