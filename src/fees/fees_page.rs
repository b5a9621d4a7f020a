//! The fees page: what each lender person has accrued, withdrawn and can
//! still withdraw.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    backend::Backend,
    bankroll::PaymentMethod,
    endpoints::{self, format_endpoint},
    fees::PersonFeeRow,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, SelectOption,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, balance_class, base,
        format_currency, load_error_page, page_header, sorted_by_label,
    },
    navigation::NavBar,
};

/// The state needed for the fees page.
#[derive(Debug, Clone)]
pub struct FeesPageState<B: Backend> {
    pub backend: B,
}

impl<B: Backend> FromRef<AppState<B>> for FeesPageState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }
}

async fn load_fees<B: Backend>(
    backend: &B,
) -> Result<(Vec<PersonFeeRow>, Vec<PaymentMethod>), Error> {
    tokio::try_join!(backend.people_fee_panel(), backend.payment_methods())
}

/// Display the fees page.
pub async fn get_fees_page<B: Backend>(State(state): State<FeesPageState<B>>) -> Response {
    let nav_bar = NavBar::new(endpoints::FEES_VIEW).into_html();

    match load_fees(&state.backend).await {
        Ok((panel, methods)) => fees_view(nav_bar, &panel, &methods).into_response(),
        Err(error) => {
            tracing::error!("Could not load the fees page: {error}");
            load_error_page("Fees", nav_bar, endpoints::FEES_VIEW, &error.to_string())
                .into_response()
        }
    }
}

fn fees_view(nav_bar: Markup, panel: &[PersonFeeRow], methods: &[PaymentMethod]) -> Markup {
    let method_options = sorted_by_label(
        methods
            .iter()
            .filter(|method| !method.is_external())
            .map(|method| SelectOption::new(method.id, method.option_label()))
            .collect(),
    );
    let total_available: f64 = panel.iter().map(|row| row.available).sum();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                (page_header("Fees", endpoints::FEES_VIEW))

                section class=(CARD_STYLE)
                {
                    div class="mb-3 flex items-center justify-between"
                    {
                        h2 class="text-lg font-semibold" { "Lenders" }
                        span class="text-sm" data-total-available="true"
                        {
                            "Available: " (format_currency(total_available))
                        }
                    }

                    @if panel.is_empty() {
                        p class="text-sm text-gray-500" { "No lenders yet." }
                    } @else {
                        div class="overflow-x-auto"
                        {
                            table class="w-full text-sm text-left" data-fee-panel="true"
                            {
                                thead class=(TABLE_HEADER_STYLE)
                                {
                                    tr
                                    {
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Person" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Fee per bet" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Accrued" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Withdrawn" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Available" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Withdraw" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                                    }
                                }

                                tbody
                                {
                                    @for (index, row) in panel.iter().enumerate() {
                                        (lender_row_view(index, row, &method_options))
                                    }
                                }
                            }
                        }
                    }
                }

                section class=(CARD_STYLE)
                {
                    h2 class="mb-3 text-lg font-semibold" { "Add lender" }

                    form
                        hx-post=(endpoints::FEE_PEOPLE_API)
                        hx-target-error="#alert-container"
                        class="grid grid-cols-1 gap-3 md:grid-cols-3 md:items-end"
                    {
                        div
                        {
                            label for="lender-name" class=(FORM_LABEL_STYLE) { "Name" }
                            input id="lender-name" type="text" name="name" required class=(FORM_TEXT_INPUT_STYLE);
                        }

                        div
                        {
                            label for="fee-per-bet" class=(FORM_LABEL_STYLE) { "Fee per bet" }
                            input
                                id="fee-per-bet"
                                type="text"
                                inputmode="decimal"
                                name="fee_per_bet"
                                required
                                placeholder="5,00"
                                class=(FORM_TEXT_INPUT_STYLE);
                        }

                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add lender" }
                    }
                }
            }
        }
    );

    base("Fees", &[], &content)
}

fn lender_row_view(index: usize, row: &PersonFeeRow, method_options: &[SelectOption]) -> Markup {
    let amount_id = format!("withdraw-amount-{index}");
    let method_id = format!("withdraw-method-{index}");

    html!(
        tr class=(TABLE_ROW_STYLE) data-lender=(row.person_name)
        {
            th scope="row" class=(TABLE_CELL_STYLE) { (row.person_name) }
            td class=(TABLE_CELL_STYLE) { (format_currency(row.fee_per_bet)) }
            td class=(TABLE_CELL_STYLE) { (format_currency(row.accrued)) }
            td class=(TABLE_CELL_STYLE) { (format_currency(row.withdrawn)) }
            td class={ (TABLE_CELL_STYLE) " font-semibold " (balance_class(row.available)) } data-available="true"
            {
                (format_currency(row.available))
            }
            td class=(TABLE_CELL_STYLE)
            {
                form
                    hx-post=(endpoints::FEE_WITHDRAWALS_API)
                    hx-target-error="#alert-container"
                    class="flex flex-wrap items-center gap-2"
                {
                    input type="hidden" name="person_name" value=(row.person_name);
                    label for=(amount_id) class="sr-only" { "Amount" }
                    input
                        id=(amount_id)
                        type="text"
                        inputmode="decimal"
                        name="amount"
                        required
                        placeholder="0,00"
                        class="w-24 rounded border border-gray-300 p-1 text-sm dark:border-gray-600 dark:bg-gray-700";
                    label for=(method_id) class="sr-only" { "Payment method" }
                    select
                        id=(method_id)
                        name="payment_method_id"
                        required
                        class="rounded border border-gray-300 p-1 text-sm dark:border-gray-600 dark:bg-gray-700"
                    {
                        option value="" { "Method..." }
                        @for choice in method_options {
                            option value=(choice.value) { (choice.label) }
                        }
                    }
                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Withdraw" }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex flex-col items-start gap-1"
                {
                    @if let Some(withdrawal_id) = row.last_withdrawal_id {
                        button
                            type="button"
                            hx-delete=(format_endpoint(endpoints::FEE_WITHDRAWAL, withdrawal_id))
                            hx-confirm="Cancel the last withdrawal?"
                            hx-target-error="#alert-container"
                            class=(BUTTON_DELETE_STYLE)
                        {
                            "Cancel last withdrawal"
                        }
                    }

                    button
                        type="button"
                        hx-delete=(format_endpoint(endpoints::FEE_PERSON, &row.person_name))
                        hx-confirm={ "Delete " (row.person_name) "?" }
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete lender"
                    }
                }
            }
        }
    )
}
