//! The partners page: the cash operation form and the history of deposits and
//! withdrawals.

use std::collections::HashMap;

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time_tz::Tz;
use uuid::Uuid;

use crate::{
    AppState, Error,
    backend::Backend,
    bankroll::PaymentMethod,
    endpoints::{self, format_endpoint},
    grouping::{group_by_month_day, grouped_list_view, local_day},
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, SelectOption, balance_class, base, delete_button,
        format_signed_currency, load_error_page, page_header, select_field, signed_total_view,
        sorted_by_label,
    },
    navigation::NavBar,
    partner::{CashOpKind, Partner, PartnerCashOp},
    timezone::{local_timezone, to_local},
};

/// The state needed for the partners page.
#[derive(Debug, Clone)]
pub struct PartnersPageState<B: Backend> {
    pub backend: B,
    pub local_timezone: String,
}

impl<B: Backend> FromRef<AppState<B>> for PartnersPageState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

struct PartnersData {
    partners: Vec<Partner>,
    cash_ops: Vec<PartnerCashOp>,
    payment_methods: Vec<PaymentMethod>,
}

async fn load_partners<B: Backend>(backend: &B) -> Result<PartnersData, Error> {
    let (partners, cash_ops, payment_methods) = tokio::try_join!(
        backend.partners(),
        backend.partner_cash_ops(),
        backend.payment_methods(),
    )?;

    Ok(PartnersData {
        partners,
        cash_ops,
        payment_methods,
    })
}

/// Display the partners page.
pub async fn get_partners_page<B: Backend>(State(state): State<PartnersPageState<B>>) -> Response {
    let timezone = match local_timezone(&state.local_timezone) {
        Ok(timezone) => timezone,
        Err(error) => return error.into_response(),
    };
    let nav_bar = NavBar::new(endpoints::PARTNERS_VIEW).into_html();

    match load_partners(&state.backend).await {
        Ok(data) => partners_view(nav_bar, &data, timezone).into_response(),
        Err(error) => {
            tracing::error!("Could not load the partners page: {error}");
            load_error_page(
                "Partners",
                nav_bar,
                endpoints::PARTNERS_VIEW,
                &error.to_string(),
            )
            .into_response()
        }
    }
}

fn partners_view(nav_bar: Markup, data: &PartnersData, timezone: &Tz) -> Markup {
    let partner_names: HashMap<Uuid, &str> = data
        .partners
        .iter()
        .map(|partner| (partner.id, partner.name.as_str()))
        .collect();
    let method_labels: HashMap<Uuid, String> = data
        .payment_methods
        .iter()
        .map(|method| (method.id, method.option_label()))
        .collect();

    let partner_options: Vec<SelectOption> = data
        .partners
        .iter()
        .map(|partner| SelectOption::new(partner.id, partner.name.as_str()))
        .collect();
    let method_options = sorted_by_label(
        data.payment_methods
            .iter()
            .filter(|method| !method.is_external())
            .map(|method| SelectOption::new(method.id, method.option_label()))
            .collect(),
    );

    let cash_ops: Vec<&PartnerCashOp> = data.cash_ops.iter().collect();
    let groups = group_by_month_day(cash_ops, |op| {
        (local_day(op.created_at, timezone), op.signed_amount())
    });

    let item_view = |op: &&PartnerCashOp| {
        let local = to_local(op.created_at, timezone);

        html!(
            div class="rounded border border-gray-200 p-3 dark:border-gray-700" data-cash-op-id=(op.id)
            {
                div class="flex items-center justify-between gap-2"
                {
                    span class="text-xs text-gray-500"
                    {
                        (format!("{:02}:{:02}", local.hour(), local.minute()))
                    }
                    (delete_button(
                        &format_endpoint(endpoints::PARTNER_CASH_OP, op.id),
                        "Delete this operation? The partner's units will be restored.",
                    ))
                }

                div class="mt-2"
                {
                    span class="font-semibold" { (partner_names.get(&op.partner_id).copied().unwrap_or("Unknown partner")) }
                    " · " (op.kind)
                }
                div class={ "mt-1 font-semibold " (balance_class(op.signed_amount())) }
                {
                    (format_signed_currency(op.signed_amount()))
                }
                @if let Some(label) = op.payment_method_id.and_then(|id| method_labels.get(&id)) {
                    div class="mt-1 text-sm text-gray-500" data-method="true" { "via " (label) }
                }
                @if let Some(note) = &op.note {
                    div class="mt-1 text-xs text-gray-500" { (note) }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                (page_header("Partners", endpoints::PARTNERS_VIEW))

                div class="grid grid-cols-1 gap-6 md:grid-cols-2"
                {
                    section class=(CARD_STYLE)
                    {
                        h2 class="text-lg font-semibold" { "Deposit or withdraw" }

                        form
                            hx-post=(endpoints::PARTNER_CASH_OPS_API)
                            hx-target-error="#alert-container"
                            class="mt-4 space-y-3"
                        {
                            (select_field("Partner", "partner_id", &partner_options, None))

                            div
                            {
                                label for="kind" class=(FORM_LABEL_STYLE) { "Operation" }
                                select id="kind" name="kind" class=(FORM_TEXT_INPUT_STYLE)
                                {
                                    @for kind in [CashOpKind::Deposit, CashOpKind::Withdraw] {
                                        option value=(kind.as_str()) { (kind) }
                                    }
                                }
                            }

                            div
                            {
                                label for="cash-op-amount" class=(FORM_LABEL_STYLE) { "Amount" }
                                input
                                    id="cash-op-amount"
                                    type="text"
                                    inputmode="decimal"
                                    name="amount"
                                    required
                                    placeholder="1000,00"
                                    class=(FORM_TEXT_INPUT_STYLE);
                            }

                            div
                            {
                                label for="payment_method_id" class=(FORM_LABEL_STYLE) { "Payment method (optional)" }
                                select id="payment_method_id" name="payment_method_id" class=(FORM_TEXT_INPUT_STYLE)
                                {
                                    option value="" { "None" }
                                    @for choice in &method_options {
                                        option value=(choice.value) { (choice.label) }
                                    }
                                }
                            }

                            div
                            {
                                label for="cash-op-note" class=(FORM_LABEL_STYLE) { "Note (optional)" }
                                input id="cash-op-note" type="text" name="note" class=(FORM_TEXT_INPUT_STYLE);
                            }

                            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save operation" }
                        }
                    }

                    section class=(CARD_STYLE) data-cash-ops="true"
                    {
                        h2 class="mb-3 text-lg font-semibold" { "History" }

                        @if groups.is_empty() {
                            p class="text-sm text-gray-500" { "No cash operations." }
                        } @else {
                            (grouped_list_view(&groups, signed_total_view, item_view))
                        }
                    }
                }
            }
        }
    );

    base("Partners", &[], &content)
}
