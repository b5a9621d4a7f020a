//! The bets page: the new-bet form, the bets in progress and the closed bets
//! with their profit split between partners.

use std::collections::{HashMap, HashSet};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::json;
use time::Date;
use uuid::Uuid;

use crate::{
    AppState, Error,
    backend::Backend,
    bankroll::Account,
    betting::{
        BetAllocation, BetBoard, BetMode, BetPlayer, BetSummary, LegStatus, organise_bets,
        summarize_bets,
    },
    endpoints::{self, format_endpoint},
    form::time_input_value,
    grouping::grouped_list_view,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, GROUP_STYLE, GROUP_SUMMARY_STYLE, PAGE_CONTAINER_STYLE,
        SelectOption, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, balance_class, base,
        delete_button, format_currency, format_signed_currency, load_error_page, page_header,
        signed_total_view, sorted_by_label,
    },
    navigation::NavBar,
    partner::{Partner, PartnerShares, allocate_bet_profit, partner_shares},
    timezone::{local_timezone, local_today},
};

const MIN_SUREBET_LEGS: usize = 2;
const MAX_LEGS: usize = 8;

/// The state needed for the bets page.
#[derive(Debug, Clone)]
pub struct BetsPageState<B: Backend> {
    pub backend: B,
    pub local_timezone: String,
}

impl<B: Backend> FromRef<AppState<B>> for BetsPageState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The shape of the new-bet form, kept in the URL.
#[derive(Debug, Default, Deserialize)]
pub struct BetsQuery {
    pub mode: Option<BetMode>,
    /// How many legs a surebet form shows.
    pub legs: Option<usize>,
}

impl BetsQuery {
    fn mode(&self) -> BetMode {
        self.mode.unwrap_or_default()
    }

    /// One leg for a single bet, between two and eight for a surebet.
    fn leg_count(&self) -> usize {
        match self.mode() {
            BetMode::Single => 1,
            BetMode::Surebet => self
                .legs
                .unwrap_or(MIN_SUREBET_LEGS)
                .clamp(MIN_SUREBET_LEGS, MAX_LEGS),
        }
    }
}

struct BetsData {
    board: BetBoard,
    accounts: Vec<Account>,
    partners: Vec<Partner>,
    shares: PartnerShares,
    players: HashMap<Uuid, HashSet<Uuid>>,
    allocations: HashMap<Uuid, HashMap<Uuid, f64>>,
}

async fn load_bets<B: Backend>(backend: &B) -> Result<BetsData, Error> {
    let (bets, legs, accounts, partners, events, capital, players, allocations) = tokio::try_join!(
        backend.bets(None),
        backend.bet_legs(),
        backend.accounts(),
        backend.partners(),
        backend.equity_events(),
        backend.current_capital(),
        backend.bet_players(),
        backend.bet_allocations(),
    )?;

    Ok(BetsData {
        board: organise_bets(summarize_bets(bets, legs)),
        shares: partner_shares(&partners, &events, capital),
        accounts,
        partners,
        players: players_by_bet(players),
        allocations: allocations_by_bet(allocations),
    })
}

fn players_by_bet(players: Vec<BetPlayer>) -> HashMap<Uuid, HashSet<Uuid>> {
    let mut by_bet: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();

    for player in players {
        by_bet
            .entry(player.bet_id)
            .or_default()
            .insert(player.partner_id);
    }

    by_bet
}

/// The stored allocation amounts of each bet, summed per partner.
fn allocations_by_bet(allocations: Vec<BetAllocation>) -> HashMap<Uuid, HashMap<Uuid, f64>> {
    let mut by_bet: HashMap<Uuid, HashMap<Uuid, f64>> = HashMap::new();

    for allocation in allocations {
        *by_bet
            .entry(allocation.bet_id)
            .or_default()
            .entry(allocation.partner_id)
            .or_default() += allocation.amount;
    }

    by_bet
}

/// Display the bets page.
pub async fn get_bets_page<B: Backend>(
    State(state): State<BetsPageState<B>>,
    Query(query): Query<BetsQuery>,
) -> Response {
    let timezone = match local_timezone(&state.local_timezone) {
        Ok(timezone) => timezone,
        Err(error) => return error.into_response(),
    };
    let nav_bar = NavBar::new(endpoints::BETS_VIEW).into_html();

    match load_bets(&state.backend).await {
        Ok(data) => bets_view(nav_bar, &data, &query, local_today(timezone)).into_response(),
        Err(error) => {
            tracing::error!("Could not load the bets page: {error}");
            load_error_page("Bets", nav_bar, endpoints::BETS_VIEW, &error.to_string())
                .into_response()
        }
    }
}

/// A partner's row in the profit split of a closed bet.
#[derive(Debug, PartialEq)]
struct AllocationRow<'a> {
    partner_name: &'a str,
    /// The amount the backend stored, if allocations were computed.
    stored: Option<f64>,
    /// The amount the bonus/malus split gives with the current quotas.
    preview: f64,
}

fn allocation_rows<'a>(
    profit: f64,
    shares: &'a PartnerShares,
    players: &HashSet<Uuid>,
    stored: Option<&HashMap<Uuid, f64>>,
) -> Vec<AllocationRow<'a>> {
    let previews = allocate_bet_profit(profit, &shares.quotas(), players);

    shares
        .rows
        .iter()
        .zip(previews)
        .map(|(row, share)| AllocationRow {
            partner_name: &row.partner.name,
            stored: stored.and_then(|stored| stored.get(&row.partner.id).copied()),
            preview: share.amount,
        })
        .collect()
}

/// Account labels with balances, e.g. "Snai - Mario (€50.00)".
fn account_options<'a>(accounts: impl Iterator<Item = &'a Account>) -> Vec<SelectOption> {
    sorted_by_label(
        accounts
            .map(|account| {
                SelectOption::new(
                    account.id,
                    format!("{} ({})", account.label(), format_currency(account.balance)),
                )
            })
            .collect(),
    )
}

fn bets_view(nav_bar: Markup, data: &BetsData, query: &BetsQuery, today: Date) -> Markup {
    let account_labels: HashMap<Uuid, String> = data
        .accounts
        .iter()
        .map(|account| (account.id, account.label()))
        .collect();
    let funded_accounts = account_options(
        data.accounts
            .iter()
            .filter(|account| account.balance > 0.0),
    );
    let all_accounts = account_options(data.accounts.iter());
    let context = BetContext {
        account_labels: &account_labels,
        all_accounts: &all_accounts,
        partners: &data.partners,
        players: &data.players,
    };

    let closed_item_view = |summary: &BetSummary| {
        let players = data.players.get(&summary.bet.id).cloned().unwrap_or_default();
        let rows = allocation_rows(
            summary.profit,
            &data.shares,
            &players,
            data.allocations.get(&summary.bet.id),
        );

        bet_card_view(summary, &context, Some(&rows))
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                (page_header("Bets", endpoints::BETS_VIEW))
                (new_bet_view(query, &funded_accounts, &data.partners, today))

                section class=(CARD_STYLE) data-in-progress="true"
                {
                    h2 class="mb-3 text-lg font-semibold"
                    {
                        "In progress "
                        span class="text-sm text-gray-500" { "(" (data.board.in_progress.len()) ")" }
                    }

                    @if data.board.in_progress.is_empty() {
                        p class="text-sm text-gray-500" { "No bets in progress." }
                    } @else {
                        div class="space-y-3"
                        {
                            @for summary in &data.board.in_progress {
                                (bet_card_view(summary, &context, None))
                            }
                        }
                    }
                }

                section class=(CARD_STYLE) data-closed="true"
                {
                    h2 class="mb-3 text-lg font-semibold" { "Closed bets" }

                    @if data.board.closed.is_empty() {
                        p class="text-sm text-gray-500" { "No closed bets." }
                    } @else {
                        (grouped_list_view(&data.board.closed, signed_total_view, closed_item_view))
                    }
                }
            }
        }
    );

    base("Bets", &[], &content)
}

fn new_bet_view(
    query: &BetsQuery,
    funded_accounts: &[SelectOption],
    partners: &[Partner],
    today: Date,
) -> Markup {
    let mode = query.mode();
    let leg_count = query.leg_count();

    html!(
        section class=(CARD_STYLE) data-new-bet="true"
        {
            h2 class="text-lg font-semibold" { "New bet" }

            form method="get" action=(endpoints::BETS_VIEW) class="mt-4 grid grid-cols-2 gap-3"
            {
                div
                {
                    label for="mode" class=(FORM_LABEL_STYLE) { "Type" }
                    select id="mode" name="mode" onchange="this.form.submit()" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value=(BetMode::Single.as_str()) selected[mode == BetMode::Single] { "Single" }
                        option value=(BetMode::Surebet.as_str()) selected[mode == BetMode::Surebet] { "Surebet" }
                    }
                }

                @if mode == BetMode::Surebet {
                    div
                    {
                        label for="legs" class=(FORM_LABEL_STYLE) { "Legs" }
                        input
                            id="legs"
                            type="number"
                            name="legs"
                            min=(MIN_SUREBET_LEGS)
                            max=(MAX_LEGS)
                            value=(leg_count)
                            onchange="this.form.submit()"
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }
            }

            form
                hx-post=(endpoints::BETS_API)
                hx-target-error="#alert-container"
                class="mt-3 space-y-4"
            {
                input type="hidden" name="mode" value=(mode.as_str());

                div class="grid grid-cols-2 gap-3"
                {
                    div
                    {
                        label for="match-date" class=(FORM_LABEL_STYLE) { "Match date" }
                        input
                            id="match-date"
                            type="date"
                            name="match_date"
                            value=(today)
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="match-time" class=(FORM_LABEL_STYLE) { "Match time" }
                        input
                            id="match-time"
                            type="time"
                            name="match_time"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                @if funded_accounts.is_empty() {
                    p class="text-sm text-amber-600" { "No account has a positive balance." }
                }

                @for index in 0..leg_count {
                    (new_leg_fields(index, funded_accounts))
                }

                @if !partners.is_empty() {
                    fieldset
                    {
                        legend class=(FORM_LABEL_STYLE) { "Played by (optional)" }
                        (player_checkboxes("new", partners, &HashSet::new()))
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save bet" }
            }
        }
    )
}

fn account_select(id: &str, options: &[SelectOption], selected: Option<&str>) -> Markup {
    html!(
        select id=(id) name="account_id" required class=(FORM_TEXT_INPUT_STYLE)
        {
            option value="" { "Choose..." }

            @for choice in options {
                option value=(choice.value) selected[selected == Some(choice.value.as_str())]
                {
                    (choice.label)
                }
            }
        }
    )
}

fn new_leg_fields(index: usize, accounts: &[SelectOption]) -> Markup {
    let number = index + 1;

    html!(
        fieldset class="grid grid-cols-2 gap-3 md:grid-cols-4" data-leg-fields=(number)
        {
            legend class="col-span-full text-sm font-semibold" { "Leg " (number) }

            div class="col-span-2 md:col-span-1"
            {
                label for={ "leg-account-" (number) } class=(FORM_LABEL_STYLE) { "Account" }
                (account_select(&format!("leg-account-{number}"), accounts, None))
            }

            div
            {
                label for={ "leg-stake-" (number) } class=(FORM_LABEL_STYLE) { "Stake" }
                input
                    id={ "leg-stake-" (number) }
                    type="text"
                    inputmode="decimal"
                    name="stake"
                    required
                    placeholder="10,00"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for={ "leg-odds-" (number) } class=(FORM_LABEL_STYLE) { "Odds" }
                input
                    id={ "leg-odds-" (number) }
                    type="text"
                    inputmode="decimal"
                    name="odds"
                    required
                    placeholder="1,85"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for={ "leg-status-" (number) } class=(FORM_LABEL_STYLE) { "Status" }
                select id={ "leg-status-" (number) } name="status" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for status in LegStatus::ALL {
                        option value=(status.as_str()) selected[status == LegStatus::Open] { (status) }
                    }
                }
            }
        }
    )
}

fn player_checkboxes(prefix: &str, partners: &[Partner], checked: &HashSet<Uuid>) -> Markup {
    html!(
        div class="flex flex-wrap gap-4"
        {
            @for partner in partners {
                @let id = format!("player-{prefix}-{}", partner.id);

                label for=(id) class="flex items-center gap-2 text-sm"
                {
                    input
                        id=(id)
                        type="checkbox"
                        name="player"
                        value=(partner.id)
                        checked[checked.contains(&partner.id)];
                    (partner.name)
                }
            }
        }
    )
}

/// What every bet card needs besides the bet itself.
struct BetContext<'a> {
    account_labels: &'a HashMap<Uuid, String>,
    all_accounts: &'a [SelectOption],
    partners: &'a [Partner],
    players: &'a HashMap<Uuid, HashSet<Uuid>>,
}

/// A bet with its legs and actions. Closed bets pass their profit split.
fn bet_card_view(
    summary: &BetSummary,
    context: &BetContext<'_>,
    allocations: Option<&[AllocationRow<'_>]>,
) -> Markup {
    let bet = &summary.bet;
    let players = context.players.get(&bet.id).cloned().unwrap_or_default();
    let kind = if summary.legs.len() > 1 {
        format!("Surebet ({} legs)", summary.legs.len())
    } else {
        "Single".to_owned()
    };

    html!(
        article class="rounded border border-gray-200 p-3 dark:border-gray-700" data-bet-id=(bet.id)
        {
            div class="flex flex-wrap items-center justify-between gap-2"
            {
                div
                {
                    span class="font-semibold" { (bet.match_date) " " (time_input_value(bet.match_time)) }
                    " "
                    span class="text-sm text-gray-500" { (kind) }
                }

                (delete_button(
                    &format_endpoint(endpoints::BET, bet.id),
                    "Delete this bet? The stakes and payouts will be reverted.",
                ))
            }

            div class="mt-2 flex flex-wrap gap-4 text-sm"
            {
                span { "Stake: " (format_currency(summary.stake_total)) }
                span { "Payout: " (format_currency(summary.payout_total)) }
                span data-profit="true"
                {
                    "Profit: "
                    span class=(balance_class(summary.profit)) { (format_signed_currency(summary.profit)) }
                }
            }

            ul class="mt-3 space-y-2"
            {
                @for leg in &summary.legs {
                    li class="rounded bg-gray-50 p-2 text-sm dark:bg-gray-900" data-leg-id=(leg.id)
                    {
                        div class="flex flex-wrap items-center justify-between gap-2"
                        {
                            span
                            {
                                (context
                                    .account_labels
                                    .get(&leg.account_id)
                                    .map(String::as_str)
                                    .unwrap_or("Unknown account"))
                                " · " (format_currency(leg.stake)) " @ " (leg.odds)
                            }

                            div class="flex items-center gap-2"
                            {
                                span class="font-semibold" data-leg-status="true" { (leg.status) }

                                @for status in LegStatus::ALL {
                                    @if status != leg.status {
                                        button
                                            type="button"
                                            hx-put=(format_endpoint(endpoints::BET_LEG_STATUS, leg.id))
                                            hx-vals=(json!({ "status": status.as_str() }))
                                            hx-target-error="#alert-container"
                                            class=(BUTTON_SECONDARY_STYLE)
                                        {
                                            (status)
                                        }
                                    }
                                }
                            }
                        }

                        @if !summary.is_closed {
                            (replace_leg_view(leg.id, leg.account_id, leg.stake, leg.odds, context.all_accounts))
                        }
                    }
                }
            }

            details class={ "mt-3 " (GROUP_STYLE) }
            {
                summary class=(GROUP_SUMMARY_STYLE) { "Edit date and time" }

                form
                    hx-put=(format_endpoint(endpoints::BET, bet.id))
                    hx-target-error="#alert-container"
                    class="flex flex-wrap items-end gap-3 px-4 pb-4"
                {
                    input
                        type="date"
                        name="match_date"
                        value=(bet.match_date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                    input
                        type="time"
                        name="match_time"
                        value=(time_input_value(bet.match_time))
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Save" }
                }
            }

            @if !context.partners.is_empty() {
                form
                    hx-put=(format_endpoint(endpoints::BET_PLAYERS, bet.id))
                    hx-target-error="#alert-container"
                    class="mt-3 flex flex-wrap items-center gap-3"
                {
                    span class="text-sm text-gray-500" { "Played by" }
                    (player_checkboxes(&bet.id.to_string(), context.partners, &players))
                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Save players" }
                }
            }

            @if let Some(rows) = allocations {
                (allocations_view(bet.id, rows))
            }
        }
    )
}

fn replace_leg_view(
    leg_id: Uuid,
    account_id: Uuid,
    stake: f64,
    odds: f64,
    accounts: &[SelectOption],
) -> Markup {
    let account_id = account_id.to_string();

    html!(
        details class="mt-2"
        {
            summary class="cursor-pointer text-xs text-gray-500" { "Replace leg" }

            form
                hx-put=(format_endpoint(endpoints::BET_LEG, leg_id))
                hx-target-error="#alert-container"
                class="mt-2 grid grid-cols-2 gap-2 md:grid-cols-4"
            {
                (account_select(&format!("replace-account-{leg_id}"), accounts, Some(&account_id)))
                input
                    type="text"
                    inputmode="decimal"
                    name="stake"
                    value=(stake)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
                input
                    type="text"
                    inputmode="decimal"
                    name="odds"
                    value=(odds)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Replace" }
            }
        }
    )
}

fn allocations_view(bet_id: Uuid, rows: &[AllocationRow<'_>]) -> Markup {
    html!(
        div class="mt-3"
        {
            table class="w-full text-sm text-left" data-allocations="true"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Partner" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Stored" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Preview" }
                    }
                }

                tbody
                {
                    @for row in rows {
                        tr class=(TABLE_ROW_STYLE) data-partner=(row.partner_name)
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { (row.partner_name) }
                            td class=(TABLE_CELL_STYLE) data-stored="true"
                            {
                                @match row.stored {
                                    Some(amount) => {
                                        span class=(balance_class(amount)) { (format_signed_currency(amount)) }
                                    }
                                    None => {
                                        span class="text-gray-400" { "-" }
                                    }
                                }
                            }
                            td class=(TABLE_CELL_STYLE) data-preview="true"
                            {
                                span class=(balance_class(row.preview)) { (format_signed_currency(row.preview)) }
                            }
                        }
                    }
                }
            }

            div class="mt-3 flex flex-wrap gap-3"
            {
                button
                    type="button"
                    hx-post=(format_endpoint(endpoints::BET_ALLOCATIONS, bet_id))
                    hx-target-error="#alert-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Compute allocations"
                }
                button
                    type="button"
                    hx-post=(format_endpoint(endpoints::BET_FEES, bet_id))
                    hx-target-error="#alert-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Compute fees"
                }
            }
        }
    )
}
