use scraper::{ElementRef, Html, Selector};

/// Get the form that submits to `endpoint` with the htmx `attribute`, e.g. "hx-post".
#[track_caller]
pub(crate) fn must_get_form_by_endpoint<'a>(
    html: &'a Html,
    attribute: &str,
    endpoint: &str,
) -> ElementRef<'a> {
    let selector = Selector::parse(&format!("form[{attribute}=\"{endpoint}\"]")).unwrap();

    html.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No form found with {attribute}=\"{endpoint}\""))
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let hx_post = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        hx_post, endpoint,
        "want form with attribute {attribute}=\"{endpoint}\", got {hx_post:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    for input in form.select(&Selector::parse("input").unwrap()) {
        let input_name = input.value().attr("name").unwrap_or_default();

        if input_name == name {
            let input_type = input.value().attr("type").unwrap_or_default();
            let input_required = input.value().attr("required");

            assert_eq!(
                input_type, type_,
                "want input with type \"{type_}\", got {input_type:?}"
            );

            assert!(
                input_required.is_some(),
                "want input with name {name} to have the required attribute but got none"
            );

            return;
        }
    }

    panic!("No input found with name \"{name}\" and type \"{type_}\"");
}

/// Assert that the select named `name` offers exactly `want_values`, ignoring
/// the empty placeholder option.
#[track_caller]
pub(crate) fn assert_select_options(form: &ElementRef<'_>, name: &str, want_values: &[String]) {
    let selector = Selector::parse(&format!("select[name=\"{name}\"] option")).unwrap();

    let got_values: Vec<String> = form
        .select(&selector)
        .filter_map(|option| option.value().attr("value"))
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect();

    assert_eq!(
        got_values, want_values,
        "want select {name} to offer {want_values:?}, got {got_values:?}"
    );
}
