//! The balances page: the bookmaker matrix, the payment-method panel, and the
//! adjustment and transaction forms with their histories.

use std::collections::HashMap;

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::OffsetDateTime;
use time_tz::Tz;
use uuid::Uuid;

use crate::{
    AppState, Error,
    backend::Backend,
    bankroll::{
        Account, AdjustmentTarget, BalanceAdjustment, Bookmaker, PaymentMethod, Person,
        Transaction, TransactionKind, TransactionStatus,
    },
    endpoints::{self, format_endpoint},
    grouping::{group_by_month_day, grouped_list_view, local_day},
    html::{
        BUTTON_CONFIRM_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, GROUP_STYLE, GROUP_SUMMARY_STYLE, PAGE_CONTAINER_STYLE,
        SelectOption, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, balance_class, base,
        delete_button, format_currency, format_signed_currency, is_zero, load_error_page,
        page_header, pending_class, select_field, signed_total_view, sorted_by_label,
    },
    navigation::NavBar,
    timezone::{local_timezone, to_local},
};

/// How many of the latest transactions the page lists.
const TRANSACTION_LIMIT: i64 = 300;
/// How many of the latest adjustments the page lists.
const ADJUSTMENT_LIMIT: i64 = 1000;

/// The state needed for the balances page.
#[derive(Debug, Clone)]
pub struct BalancesPageState<B: Backend> {
    pub backend: B,
    pub local_timezone: String,
}

impl<B: Backend> FromRef<AppState<B>> for BalancesPageState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The choices of the transaction and adjustment forms, kept in the URL so
/// that the option lists can be filtered on the server.
#[derive(Debug, Default, Deserialize)]
pub struct BalancesQuery {
    /// The person whose accounts and methods the transaction form offers.
    pub person: Option<String>,
    /// The kind of transaction to enter, deposit by default.
    pub kind: Option<TransactionKind>,
    /// Whether the adjustment form targets accounts or payment methods.
    pub target: Option<AdjustmentTarget>,
}

/// Everything the balances page reads from the backend.
struct BalancesData {
    people: Vec<Person>,
    bookmakers: Vec<Bookmaker>,
    accounts: Vec<Account>,
    payment_methods: Vec<PaymentMethod>,
    panel: Vec<PaymentMethod>,
    transactions: Vec<Transaction>,
    adjustments: Vec<BalanceAdjustment>,
}

async fn load_balances<B: Backend>(backend: &B) -> Result<BalancesData, Error> {
    let (people, bookmakers, accounts, payment_methods, panel, transactions, adjustments) = tokio::try_join!(
        backend.people(),
        backend.bookmakers(),
        backend.accounts(),
        backend.payment_methods(),
        backend.payment_methods_panel(),
        backend.recent_transactions(TRANSACTION_LIMIT),
        backend.balance_adjustments(None, ADJUSTMENT_LIMIT),
    )?;

    Ok(BalancesData {
        people,
        bookmakers,
        accounts,
        payment_methods,
        panel,
        transactions,
        adjustments,
    })
}

/// Display the balances page.
///
/// If any read fails, the page shows the backend's message in an error banner.
pub async fn get_balances_page<B: Backend>(
    State(state): State<BalancesPageState<B>>,
    Query(query): Query<BalancesQuery>,
) -> Response {
    let timezone = match local_timezone(&state.local_timezone) {
        Ok(timezone) => timezone,
        Err(error) => return error.into_response(),
    };
    let nav_bar = NavBar::new(endpoints::BALANCES_VIEW).into_html();

    match load_balances(&state.backend).await {
        Ok(data) => balances_view(nav_bar, &data, &query, timezone).into_response(),
        Err(error) => {
            tracing::error!("Could not load the balances page: {error}");
            load_error_page(
                "Balances",
                nav_bar,
                endpoints::BALANCES_VIEW,
                &error.to_string(),
            )
            .into_response()
        }
    }
}

/// The option labels of every account and payment method, by id.
struct Labels {
    accounts: HashMap<Uuid, String>,
    methods: HashMap<Uuid, String>,
}

impl Labels {
    fn new(accounts: &[Account], methods: &[PaymentMethod]) -> Self {
        Self {
            accounts: accounts
                .iter()
                .map(|account| (account.id, account.label()))
                .collect(),
            methods: methods
                .iter()
                .map(|method| (method.id, method.option_label()))
                .collect(),
        }
    }

    fn account(&self, id: Option<Uuid>) -> Option<&str> {
        id.and_then(|id| self.accounts.get(&id)).map(String::as_str)
    }

    fn method(&self, id: Option<Uuid>) -> Option<&str> {
        id.and_then(|id| self.methods.get(&id)).map(String::as_str)
    }

    fn adjustment_target(&self, adjustment: &BalanceAdjustment) -> String {
        let label = match adjustment.target_type {
            AdjustmentTarget::Account => self.account(Some(adjustment.target_id)),
            AdjustmentTarget::PaymentMethod => self.method(Some(adjustment.target_id)),
        };

        label
            .map(str::to_owned)
            .unwrap_or_else(|| adjustment.target_id.to_string())
    }
}

/// A person's row of the payment-method panel.
#[derive(Debug, PartialEq)]
struct PersonMethods<'a> {
    person_name: &'a str,
    balance: f64,
    pending_incoming: f64,
    methods: Vec<&'a PaymentMethod>,
}

impl PersonMethods<'_> {
    fn total(&self) -> f64 {
        self.balance + self.pending_incoming
    }
}

/// Sum the methods of each person, leaving out the external method.
fn person_methods<'a>(people: &'a [Person], panel: &'a [PaymentMethod]) -> Vec<PersonMethods<'a>> {
    people
        .iter()
        .map(|person| {
            let mut methods: Vec<&PaymentMethod> = panel
                .iter()
                .filter(|method| method.owner_name == person.name && !method.is_external())
                .collect();
            methods.sort_by(|a, b| a.label.cmp(&b.label));

            PersonMethods {
                person_name: &person.name,
                balance: methods.iter().map(|method| method.balance).sum(),
                pending_incoming: methods.iter().map(|method| method.pending_incoming).sum(),
                methods,
            }
        })
        .collect()
}

fn account_options<'a>(accounts: impl Iterator<Item = &'a Account>) -> Vec<SelectOption> {
    sorted_by_label(
        accounts
            .map(|account| SelectOption::new(account.id, account.label()))
            .collect(),
    )
}

fn method_options<'a>(methods: impl Iterator<Item = &'a PaymentMethod>) -> Vec<SelectOption> {
    sorted_by_label(
        methods
            .filter(|method| !method.is_external())
            .map(|method| SelectOption::new(method.id, method.option_label()))
            .collect(),
    )
}

/// The source and destination choices of the transaction form.
#[derive(Debug, PartialEq)]
struct TransactionOptions {
    from_label: &'static str,
    from: Vec<SelectOption>,
    to_label: &'static str,
    to: Vec<SelectOption>,
}

/// The sources and destinations a transaction of `kind` by `person_name` may use.
///
/// Deposits go from the person's methods to their accounts, withdrawals from
/// their accounts to their methods, and transfers from their methods to any
/// method.
fn transaction_options(
    kind: TransactionKind,
    person_name: &str,
    accounts: &[Account],
    methods: &[PaymentMethod],
) -> TransactionOptions {
    let own_accounts = || {
        account_options(
            accounts
                .iter()
                .filter(|account| account.person_name == person_name),
        )
    };
    let own_methods = || {
        method_options(
            methods
                .iter()
                .filter(|method| method.owner_name == person_name),
        )
    };

    match kind {
        TransactionKind::Withdraw => TransactionOptions {
            from_label: "From bookmaker account",
            from: own_accounts(),
            to_label: "To payment method",
            to: own_methods(),
        },
        TransactionKind::Transfer => TransactionOptions {
            from_label: "From payment method",
            from: own_methods(),
            to_label: "To payment method",
            to: method_options(methods.iter()),
        },
        TransactionKind::Deposit | TransactionKind::Adjust => TransactionOptions {
            from_label: "From payment method",
            from: own_methods(),
            to_label: "To bookmaker account",
            to: own_accounts(),
        },
    }
}

fn balances_view(
    nav_bar: Markup,
    data: &BalancesData,
    query: &BalancesQuery,
    timezone: &Tz,
) -> Markup {
    let labels = Labels::new(&data.accounts, &data.payment_methods);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                (page_header("Balances", endpoints::BALANCES_VIEW))
                (bookmaker_matrix_view(&data.people, &data.bookmakers, &data.accounts))
                (payment_panel_view(&person_methods(&data.people, &data.panel)))

                div class="grid grid-cols-1 gap-6 md:grid-cols-2"
                {
                    (adjustments_view(data, query, &labels, timezone))
                    (transactions_view(data, query, &labels, timezone))
                }

                (registry_view())
            }
        }
    );

    base("Balances", &[], &content)
}

fn bookmaker_matrix_view(
    people: &[Person],
    bookmakers: &[Bookmaker],
    accounts: &[Account],
) -> Markup {
    let balances: HashMap<(&str, &str), f64> = accounts
        .iter()
        .map(|account| {
            (
                (account.person_name.as_str(), account.bookmaker_name.as_str()),
                account.balance,
            )
        })
        .collect();

    html!(
        section class=(CARD_STYLE)
        {
            div class="flex items-center justify-between"
            {
                h2 class="text-lg font-semibold" { "Bookmakers" }
                span class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "People: " (people.len()) ", bookmakers: " (bookmakers.len())
                }
            }

            div class="mt-4 overflow-x-auto"
            {
                table class="w-full text-sm text-left" data-matrix="true"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Person" }

                            @for bookmaker in bookmakers {
                                th scope="col" class="px-3 py-2 text-center"
                                {
                                    img
                                        src=(bookmaker.logo_path())
                                        alt=(bookmaker.name)
                                        title=(bookmaker.name)
                                        onerror="this.replaceWith(this.alt)"
                                        class="mx-auto h-[30px] w-auto max-w-[120px]";
                                }
                            }
                        }
                    }

                    tbody
                    {
                        @for person in people {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                th scope="row" class=(TABLE_CELL_STYLE) { (person.name) }

                                @for bookmaker in bookmakers {
                                    @let balance = balances
                                        .get(&(person.name.as_str(), bookmaker.name.as_str()))
                                        .copied()
                                        .unwrap_or(0.0);

                                    td
                                        class={ "px-3 py-2 tabular-nums " (balance_class(balance)) }
                                        data-balance-cell="true"
                                    {
                                        (format_currency(balance))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn payment_panel_view(rows: &[PersonMethods<'_>]) -> Markup {
    html!(
        section class=(CARD_STYLE)
        {
            h2 class="mb-3 text-lg font-semibold" { "Payment methods" }

            div class="overflow-x-auto"
            {
                table class="w-full text-sm text-left" data-payment-panel="true"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Person" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Balance" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "In transit" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Methods" }
                        }
                    }

                    tbody
                    {
                        @for row in rows {
                            tr class=(TABLE_ROW_STYLE) data-person=(row.person_name)
                            {
                                th scope="row" class=(TABLE_CELL_STYLE) { (row.person_name) }
                                td class={ (TABLE_CELL_STYLE) " " (balance_class(row.balance)) }
                                {
                                    (format_currency(row.balance))
                                }
                                td class={ (TABLE_CELL_STYLE) " " (pending_class(row.pending_incoming)) }
                                {
                                    (format_currency(row.pending_incoming))
                                }
                                td
                                    class={ (TABLE_CELL_STYLE) " " (balance_class(row.total())) }
                                    data-total="true"
                                {
                                    (format_currency(row.total()))
                                }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    @if row.methods.is_empty() {
                                        span class="text-gray-400" { "-" }
                                    } @else {
                                        div class="flex flex-wrap gap-2"
                                        {
                                            @for method in &row.methods {
                                                div class="rounded border border-gray-200 px-2 py-1 text-xs dark:border-gray-700"
                                                    data-method=(method.label)
                                                {
                                                    div { (method.label) }
                                                    div class=(balance_class(method.balance))
                                                    {
                                                        (format_currency(method.balance))
                                                    }

                                                    @if !is_zero(method.pending_incoming) {
                                                        div class=(pending_class(method.pending_incoming))
                                                        {
                                                            "in transit " (format_currency(method.pending_incoming))
                                                        }
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

/// The hour and minute of `timestamp` in the local timezone, e.g. "09:05".
fn local_time(timestamp: OffsetDateTime, timezone: &Tz) -> String {
    let local = to_local(timestamp, timezone);
    format!("{:02}:{:02}", local.hour(), local.minute())
}

fn adjustments_view(
    data: &BalancesData,
    query: &BalancesQuery,
    labels: &Labels,
    timezone: &Tz,
) -> Markup {
    let target = query.target.unwrap_or(AdjustmentTarget::Account);
    let target_options = match target {
        AdjustmentTarget::Account => account_options(data.accounts.iter()),
        AdjustmentTarget::PaymentMethod => method_options(data.payment_methods.iter()),
    };
    let target_label = match target {
        AdjustmentTarget::Account => "Bookmaker account",
        AdjustmentTarget::PaymentMethod => "Payment method",
    };

    let (baseline, regular): (Vec<&BalanceAdjustment>, Vec<&BalanceAdjustment>) = data
        .adjustments
        .iter()
        .partition(|adjustment| adjustment.is_baseline());
    let baseline_count = baseline.len();
    let key = |adjustment: &&BalanceAdjustment| {
        (
            local_day(adjustment.created_at, timezone),
            adjustment.amount,
        )
    };
    let regular = group_by_month_day(regular, key);
    let baseline = group_by_month_day(baseline, key);

    let item_view = |adjustment: &&BalanceAdjustment| {
        let target_kind = match adjustment.target_type {
            AdjustmentTarget::Account => "Account",
            AdjustmentTarget::PaymentMethod => "Method",
        };

        html!(
            div class="rounded border border-gray-200 p-3 dark:border-gray-700"
                data-adjustment-id=(adjustment.id)
            {
                div class="flex items-center justify-between gap-2"
                {
                    span class="text-xs text-gray-500" { (local_time(adjustment.created_at, timezone)) }
                    (delete_button(
                        &format_endpoint(endpoints::ADJUSTMENT, adjustment.id),
                        "Delete this adjustment? The balance will be restored.",
                    ))
                }
                div class="mt-2"
                {
                    span class="text-gray-500" { (target_kind) ": " }
                    (labels.adjustment_target(adjustment))
                }
                div class={ "mt-1 font-semibold " (balance_class(adjustment.amount)) }
                {
                    (format_signed_currency(adjustment.amount))
                }
                @if let Some(note) = &adjustment.note {
                    div class="mt-1 text-xs text-gray-500" { (note) }
                }
            }
        )
    };

    html!(
        section class=(CARD_STYLE) data-adjustments="true"
        {
            h2 class="text-lg font-semibold" { "Adjustments" }

            form method="get" action=(endpoints::BALANCES_VIEW) class="mt-4"
            {
                @if let Some(person) = &query.person {
                    input type="hidden" name="person" value=(person);
                }
                @if let Some(kind) = query.kind {
                    input type="hidden" name="kind" value=(kind.as_str());
                }

                label for="target" class=(FORM_LABEL_STYLE) { "Target" }
                select
                    id="target"
                    name="target"
                    onchange="this.form.submit()"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option
                        value=(AdjustmentTarget::Account.as_str())
                        selected[target == AdjustmentTarget::Account]
                    {
                        "Bookmaker account"
                    }
                    option
                        value=(AdjustmentTarget::PaymentMethod.as_str())
                        selected[target == AdjustmentTarget::PaymentMethod]
                    {
                        "Payment method"
                    }
                }
            }

            form
                hx-post=(endpoints::ADJUSTMENTS_API)
                hx-target-error="#alert-container"
                class="mt-3 space-y-3"
            {
                input type="hidden" name="target_type" value=(target.as_str());

                (select_field(target_label, "target_id", &target_options, None))

                div
                {
                    label for="adjustment-amount" class=(FORM_LABEL_STYLE) { "Amount (+/-)" }
                    input
                        id="adjustment-amount"
                        type="text"
                        inputmode="decimal"
                        name="amount"
                        required
                        placeholder="-25,00"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="adjustment-note" class=(FORM_LABEL_STYLE) { "Note (optional)" }
                    input
                        id="adjustment-note"
                        type="text"
                        name="note"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save adjustment" }
            }

            h3 class="mt-6 mb-2 text-sm font-semibold" { "History" }

            @if regular.is_empty() {
                p class="text-sm text-gray-500" { "No adjustments." }
            } @else {
                (grouped_list_view(&regular, signed_total_view, item_view))
            }

            details class={ "mt-6 " (GROUP_STYLE) } data-baseline-adjustments="true"
            {
                summary class=(GROUP_SUMMARY_STYLE)
                {
                    span class="font-semibold"
                    {
                        "Initial balances "
                        span class="text-xs text-gray-500" { "(set saldo a valore)" }
                    }
                    span class="text-gray-500" { (baseline_count) " rows" }
                }

                div class="px-4 pb-4"
                {
                    @if baseline.is_empty() {
                        p class="text-sm text-gray-500" { "No initial balances." }
                    } @else {
                        (grouped_list_view(&baseline, signed_total_view, item_view))
                    }
                }
            }
        }
    )
}

fn transactions_view(
    data: &BalancesData,
    query: &BalancesQuery,
    labels: &Labels,
    timezone: &Tz,
) -> Markup {
    let person_name = query
        .person
        .as_deref()
        .filter(|name| data.people.iter().any(|person| person.name == *name))
        .or_else(|| data.people.first().map(|person| person.name.as_str()))
        .unwrap_or_default();
    let kind = match query.kind {
        Some(TransactionKind::Withdraw) => TransactionKind::Withdraw,
        Some(TransactionKind::Transfer) => TransactionKind::Transfer,
        _ => TransactionKind::Deposit,
    };
    let options = transaction_options(kind, person_name, &data.accounts, &data.payment_methods);

    let transactions: Vec<&Transaction> = data.transactions.iter().collect();
    let groups = group_by_month_day(transactions, |transaction| {
        (
            local_day(transaction.created_at, timezone),
            transaction.amount,
        )
    });

    let total_view =
        |total: f64| html!(span class="font-semibold" { "Total movements: " (format_currency(total)) });
    let item_view = |transaction: &&Transaction| transaction_item_view(transaction, labels, timezone);

    html!(
        section class=(CARD_STYLE) data-transactions="true"
        {
            h2 class="text-lg font-semibold" { "Transactions" }

            form
                method="get"
                action=(endpoints::BALANCES_VIEW)
                class="mt-4 grid grid-cols-2 gap-3"
                data-transaction-filter="true"
            {
                @if let Some(target) = query.target {
                    input type="hidden" name="target" value=(target.as_str());
                }

                div
                {
                    label for="kind" class=(FORM_LABEL_STYLE) { "Kind" }
                    select id="kind" name="kind" onchange="this.form.submit()" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for choice in [TransactionKind::Deposit, TransactionKind::Withdraw, TransactionKind::Transfer] {
                            option value=(choice.as_str()) selected[choice == kind] { (choice) }
                        }
                    }
                }

                div
                {
                    label for="person" class=(FORM_LABEL_STYLE) { "Person" }
                    select id="person" name="person" onchange="this.form.submit()" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for person in &data.people {
                            option value=(person.name) selected[person.name == person_name] { (person.name) }
                        }
                    }
                }
            }

            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                class="mt-3 space-y-3"
            {
                input type="hidden" name="kind" value=(kind.as_str());

                @if kind == TransactionKind::Withdraw {
                    div
                    {
                        label for="status" class=(FORM_LABEL_STYLE) { "Withdrawal status" }
                        select id="status" name="status" class=(FORM_TEXT_INPUT_STYLE)
                        {
                            option value=(TransactionStatus::Pending.as_str()) selected { "In transit" }
                            option value=(TransactionStatus::Completed.as_str()) { "Arrived" }
                        }
                    }
                }

                (select_field(options.from_label, "from_id", &options.from, None))
                (select_field(options.to_label, "to_id", &options.to, None))

                div
                {
                    label for="transaction-amount" class=(FORM_LABEL_STYLE) { "Amount" }
                    input
                        id="transaction-amount"
                        type="text"
                        inputmode="decimal"
                        name="amount"
                        required
                        placeholder="100,00"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="transaction-note" class=(FORM_LABEL_STYLE) { "Note (optional)" }
                    input
                        id="transaction-note"
                        type="text"
                        name="note"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save transaction" }
            }

            h3 class="mt-6 mb-2 text-sm font-semibold" { "History" }

            @if groups.is_empty() {
                p class="text-sm text-gray-500" { "No transactions." }
            } @else {
                (grouped_list_view(&groups, total_view, item_view))
            }
        }
    )
}

fn transaction_item_view(
    transaction: &Transaction,
    labels: &Labels,
    timezone: &Tz,
) -> Markup {
    let from = labels
        .account(transaction.from_account_id)
        .or_else(|| labels.method(transaction.from_payment_method_id))
        .unwrap_or("-");
    let to = labels
        .account(transaction.to_account_id)
        .or_else(|| labels.method(transaction.to_payment_method_id))
        .unwrap_or("-");

    html!(
        div class="rounded border border-gray-200 p-3 dark:border-gray-700"
            data-transaction-id=(transaction.id)
        {
            div class="flex items-center justify-between gap-2"
            {
                span class="text-xs text-gray-500" { (local_time(transaction.created_at, timezone)) }

                div class="flex items-center gap-3"
                {
                    @if transaction.is_pending_withdrawal() {
                        button
                            type="button"
                            hx-put=(format_endpoint(endpoints::TRANSACTION_ARRIVED, transaction.id))
                            hx-target-error="#alert-container"
                            class=(BUTTON_CONFIRM_STYLE)
                        {
                            "Mark arrived"
                        }
                    }

                    (delete_button(
                        &format_endpoint(endpoints::TRANSACTION, transaction.id),
                        "Delete this transaction? Balances will be restored.",
                    ))
                }
            }

            div class="mt-2"
            {
                (transaction.kind) " "
                span class="text-gray-500" { "(" (transaction.status.as_str()) ")" }
            }
            div class="mt-1" data-route="true" { (from) " → " (to) }
            div class="mt-1 font-semibold" { (format_currency(transaction.amount)) }

            @if let Some(note) = &transaction.note {
                div class="mt-1 text-xs text-gray-500" { (note) }
            }
        }
    )
}

fn registry_view() -> Markup {
    let name_form = |endpoint: &str, id: &str, label: &str, button: &str| {
        html!(
            form
                hx-post=(endpoint)
                hx-target-error="#alert-container"
                class="flex items-end gap-3"
            {
                div class="grow"
                {
                    label for=(id) class=(FORM_LABEL_STYLE) { (label) }
                    input id=(id) type="text" name="name" required class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class="px-4 py-2 bg-blue-500 text-white rounded" { (button) }
            }
        )
    };

    html!(
        section class=(CARD_STYLE)
        {
            h2 class="mb-3 text-lg font-semibold" { "Add bookmaker or person" }

            div class="grid grid-cols-1 gap-4 md:grid-cols-2"
            {
                (name_form(endpoints::BOOKMAKERS_API, "bookmaker-name", "Bookmaker", "Add bookmaker"))
                (name_form(endpoints::PEOPLE_API, "person-name", "Person", "Add person"))
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use axum::extract::{Query, State};
    use scraper::{Html, Selector};
    use time::macros::datetime;

    use crate::{
        bankroll::{
            AdjustmentTarget, BASELINE_NOTE, TransactionKind,
            test_data::{account, adjustment, bookmaker, method, person, withdrawal},
        },
        endpoints::{self, format_endpoint},
        test_utils::{
            MemoryBackend, assert_form_input, assert_hx_endpoint, assert_select_options,
            assert_status_ok, assert_valid_html, must_get_form_by_endpoint, parse_html_document,
            select_text,
        },
        timezone::local_timezone,
    };

    use super::{BalancesPageState, BalancesQuery, get_balances_page, local_time, person_methods};

    #[test]
    fn local_time_uses_the_offset_at_the_timestamp() {
        let rome = local_timezone("Europe/Rome").unwrap();

        assert_eq!(local_time(datetime!(2026-01-15 08:05 UTC), rome), "09:05");
        assert_eq!(local_time(datetime!(2026-07-15 08:05 UTC), rome), "10:05");
    }

    fn state(backend: &MemoryBackend) -> BalancesPageState<MemoryBackend> {
        BalancesPageState {
            backend: backend.clone(),
            local_timezone: "UTC".to_owned(),
        }
    }

    async fn render(backend: &MemoryBackend, query: BalancesQuery) -> Html {
        let response = get_balances_page(State(state(backend)), Query(query)).await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        html
    }

    #[tokio::test]
    async fn matrix_shows_zero_for_missing_accounts() {
        let backend = MemoryBackend::new();
        {
            let mut tables = backend.tables();
            tables.people = vec![person("Luigi"), person("Mario")];
            tables.bookmakers = vec![bookmaker("Bet 365"), bookmaker("Snai")];
            tables.accounts = vec![
                account("Mario", "Snai", 50.0),
                account("Luigi", "Bet 365", -12.5),
            ];
        }

        let html = render(&backend, BalancesQuery::default()).await;

        let cells = select_text(&html, "table[data-matrix] td[data-balance-cell]");
        assert_eq!(cells, vec!["-€12.50", "€0.00", "€0.00", "€50.00"]);

        let logo = html
            .select(&Selector::parse("table[data-matrix] thead img").unwrap())
            .next()
            .expect("missing bookmaker logo");
        assert_eq!(logo.value().attr("src"), Some("/static/bookmakers/bet365.png"));
        assert_eq!(logo.value().attr("alt"), Some("Bet 365"));
    }

    #[tokio::test]
    async fn payment_panel_skips_external_method() {
        let backend = MemoryBackend::new();
        {
            let mut tables = backend.tables();
            tables.people = vec![person("Mario")];
            let mut paypal = method("Mario", "PayPal", 100.0);
            paypal.pending_incoming = 25.0;
            tables.payment_methods_panel = vec![
                paypal,
                method("Mario", "__ESTERNO__", 1000.0),
                method("Mario", "Revolut", 10.0),
            ];
        }

        let html = render(&backend, BalancesQuery::default()).await;

        assert_eq!(
            select_text(&html, "table[data-payment-panel] [data-method] div:first-child"),
            vec!["PayPal", "Revolut"]
        );
        assert_eq!(
            select_text(&html, "table[data-payment-panel] td[data-total]"),
            vec!["€135.00"]
        );
        assert!(
            select_text(&html, "table[data-payment-panel]")
                .concat()
                .contains("in transit €25.00")
        );
    }

    #[test]
    fn person_methods_sums_balance_and_pending() {
        let people = vec![person("Mario"), person("Luigi")];
        let mut card = method("Mario", "Card", 40.0);
        card.pending_incoming = 5.0;
        let panel = vec![card, method("Mario", "Bank", 60.0)];

        let rows = person_methods(&people, &panel);

        assert_eq!(rows[0].balance, 100.0);
        assert_eq!(rows[0].pending_incoming, 5.0);
        assert_eq!(rows[0].total(), 105.0);
        assert_eq!(rows[0].methods[0].label, "Bank");
        assert!(rows[1].methods.is_empty());
    }

    #[tokio::test]
    async fn withdraw_form_offers_the_persons_accounts_and_methods() {
        let backend = MemoryBackend::new();
        let marios_account = account("Mario", "Snai", 50.0);
        let marios_paypal = method("Mario", "PayPal", 0.0);
        {
            let mut tables = backend.tables();
            tables.people = vec![person("Luigi"), person("Mario")];
            tables.accounts = vec![marios_account.clone(), account("Luigi", "Snai", 10.0)];
            tables.payment_methods = vec![
                marios_paypal.clone(),
                method("Mario", "__ESTERNO__", 0.0),
                method("Luigi", "PayPal", 0.0),
            ];
        }

        let html = render(
            &backend,
            BalancesQuery {
                person: Some("Mario".to_owned()),
                kind: Some(TransactionKind::Withdraw),
                target: None,
            },
        )
        .await;

        let form = must_get_form_by_endpoint(&html, "hx-post", endpoints::TRANSACTIONS_API);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "amount", "text");
        assert_select_options(&form, "from_id", &[marios_account.id.to_string()]);
        assert_select_options(&form, "to_id", &[marios_paypal.id.to_string()]);
        assert_eq!(
            select_text(&html, "select[name=status] option[selected]"),
            vec!["In transit"]
        );
    }

    #[tokio::test]
    async fn transfer_form_can_send_to_any_method() {
        let backend = MemoryBackend::new();
        let marios_paypal = method("Mario", "PayPal", 0.0);
        let luigis_bank = method("Luigi", "Bank", 0.0);
        {
            let mut tables = backend.tables();
            tables.people = vec![person("Mario"), person("Luigi")];
            tables.payment_methods = vec![
                marios_paypal.clone(),
                luigis_bank.clone(),
                method("Luigi", "__ESTERNO__", 0.0),
            ];
        }

        let html = render(
            &backend,
            BalancesQuery {
                person: None,
                kind: Some(TransactionKind::Transfer),
                target: None,
            },
        )
        .await;

        let form = must_get_form_by_endpoint(&html, "hx-post", endpoints::TRANSACTIONS_API);
        assert_select_options(&form, "from_id", &[marios_paypal.id.to_string()]);
        // Sorted by label: "Bank (Luigi)" before "PayPal (Mario)".
        assert_select_options(
            &form,
            "to_id",
            &[luigis_bank.id.to_string(), marios_paypal.id.to_string()],
        );
        assert!(select_text(&html, "select[name=status]").is_empty());
    }

    #[tokio::test]
    async fn adjustment_form_targets_methods_when_asked() {
        let backend = MemoryBackend::new();
        let paypal = method("Mario", "PayPal", 0.0);
        {
            let mut tables = backend.tables();
            tables.people = vec![person("Mario")];
            tables.accounts = vec![account("Mario", "Snai", 0.0)];
            tables.payment_methods = vec![paypal.clone()];
        }

        let html = render(
            &backend,
            BalancesQuery {
                person: None,
                kind: None,
                target: Some(AdjustmentTarget::PaymentMethod),
            },
        )
        .await;

        let form = must_get_form_by_endpoint(&html, "hx-post", endpoints::ADJUSTMENTS_API);
        assert_form_input(&form, "amount", "text");
        assert_select_options(&form, "target_id", &[paypal.id.to_string()]);
    }

    #[tokio::test]
    async fn pending_withdrawal_can_be_marked_arrived() {
        let backend = MemoryBackend::new();
        let snai = account("Mario", "Snai", 0.0);
        let paypal = method("Mario", "PayPal", 0.0);
        let pending = withdrawal(&snai, &paypal, 80.0, datetime!(2025-03-02 10:15 UTC));
        {
            let mut tables = backend.tables();
            tables.people = vec![person("Mario")];
            tables.accounts = vec![snai.clone()];
            tables.payment_methods = vec![paypal.clone()];
            tables.transactions = vec![pending.clone()];
        }

        let html = render(&backend, BalancesQuery::default()).await;

        let arrived_url = format_endpoint(endpoints::TRANSACTION_ARRIVED, pending.id);
        assert_eq!(
            select_text(&html, &format!("button[hx-put=\"{arrived_url}\"]")),
            vec!["Mark arrived"]
        );
        assert_eq!(
            select_text(&html, "[data-transaction-id] [data-route]"),
            vec!["Snai - Mario → PayPal (Mario)"]
        );
    }

    #[tokio::test]
    async fn baseline_adjustments_are_listed_apart() {
        let backend = MemoryBackend::new();
        let snai = account("Mario", "Snai", 0.0);
        {
            let mut tables = backend.tables();
            tables.people = vec![person("Mario")];
            tables.accounts = vec![snai.clone()];
            tables.adjustments = vec![
                adjustment(&snai, 500.0, Some(BASELINE_NOTE), datetime!(2025-01-01 9:00 UTC)),
                adjustment(&snai, -5.0, Some("fee"), datetime!(2025-01-02 9:00 UTC)),
            ];
        }

        let html = render(&backend, BalancesQuery::default()).await;

        assert_eq!(
            select_text(
                &html,
                "details[data-baseline-adjustments] [data-adjustment-id] div.font-semibold"
            ),
            vec!["+€500.00"]
        );
        assert_eq!(
            select_text(&html, "[data-adjustment-id] div.font-semibold").len(),
            2
        );
    }

    #[tokio::test]
    async fn failed_read_shows_error_banner() {
        let backend = MemoryBackend::failing("permission denied for table accounts");

        let response =
            get_balances_page(State(state(&backend)), Query(BalancesQuery::default())).await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_eq!(
            select_text(&html, "[data-error-banner]"),
            vec!["Error: permission denied for table accounts"]
        );
    }
}
