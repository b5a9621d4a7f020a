//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    backend::Backend,
    bankroll::{
        create_adjustment_endpoint, create_bookmaker_endpoint, create_person_endpoint,
        create_transaction_endpoint, delete_adjustment_endpoint, delete_transaction_endpoint,
        get_balances_page, mark_transaction_arrived_endpoint,
    },
    betting::{
        compute_allocations_endpoint, compute_fees_endpoint, create_bet_endpoint,
        delete_bet_endpoint, edit_bet_endpoint, get_bets_page, replace_leg_endpoint,
        set_bet_players_endpoint, set_leg_status_endpoint,
    },
    endpoints,
    fees::{
        cancel_fee_withdrawal_endpoint, create_fee_person_endpoint, delete_fee_person_endpoint,
        get_fees_page, withdraw_fee_endpoint,
    },
    not_found::get_404_not_found,
    partner::{apply_cash_op_endpoint, delete_cash_op_endpoint, get_partners_page},
    summary::get_summary_page,
};

/// Return a router with all the app's routes.
pub fn build_router<B: Backend>(state: AppState<B>) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::BALANCES_VIEW, get(get_balances_page::<B>))
        .route(endpoints::BETS_VIEW, get(get_bets_page::<B>))
        .route(endpoints::SUMMARY_VIEW, get(get_summary_page::<B>))
        .route(endpoints::PARTNERS_VIEW, get(get_partners_page::<B>))
        .route(endpoints::FEES_VIEW, get(get_fees_page::<B>));

    let bankroll_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint::<B>),
        )
        .route(
            endpoints::TRANSACTION,
            delete(delete_transaction_endpoint::<B>),
        )
        .route(
            endpoints::TRANSACTION_ARRIVED,
            put(mark_transaction_arrived_endpoint::<B>),
        )
        .route(
            endpoints::ADJUSTMENTS_API,
            post(create_adjustment_endpoint::<B>),
        )
        .route(
            endpoints::ADJUSTMENT,
            delete(delete_adjustment_endpoint::<B>),
        )
        .route(
            endpoints::BOOKMAKERS_API,
            post(create_bookmaker_endpoint::<B>),
        )
        .route(endpoints::PEOPLE_API, post(create_person_endpoint::<B>));

    let betting_routes = Router::new()
        .route(endpoints::BETS_API, post(create_bet_endpoint::<B>))
        .route(
            endpoints::BET,
            put(edit_bet_endpoint::<B>).delete(delete_bet_endpoint::<B>),
        )
        .route(endpoints::BET_PLAYERS, put(set_bet_players_endpoint::<B>))
        .route(
            endpoints::BET_ALLOCATIONS,
            post(compute_allocations_endpoint::<B>),
        )
        .route(endpoints::BET_FEES, post(compute_fees_endpoint::<B>))
        .route(endpoints::BET_LEG, put(replace_leg_endpoint::<B>))
        .route(
            endpoints::BET_LEG_STATUS,
            put(set_leg_status_endpoint::<B>),
        );

    let partner_routes = Router::new()
        .route(
            endpoints::PARTNER_CASH_OPS_API,
            post(apply_cash_op_endpoint::<B>),
        )
        .route(
            endpoints::PARTNER_CASH_OP,
            delete(delete_cash_op_endpoint::<B>),
        );

    // `/api/fee_people/withdrawals` takes precedence over `/{person_name}`.
    let fee_routes = Router::new()
        .route(
            endpoints::FEE_WITHDRAWALS_API,
            post(withdraw_fee_endpoint::<B>),
        )
        .route(
            endpoints::FEE_WITHDRAWAL,
            delete(cancel_fee_withdrawal_endpoint::<B>),
        )
        .route(
            endpoints::FEE_PEOPLE_API,
            post(create_fee_person_endpoint::<B>),
        )
        .route(
            endpoints::FEE_PERSON,
            delete(delete_fee_person_endpoint::<B>),
        );

    page_routes
        .merge(bankroll_routes)
        .merge(betting_routes)
        .merge(partner_routes)
        .merge(fee_routes)
        .route(endpoints::COFFEE, get(get_coffee))
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the balances page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::BALANCES_VIEW)
}
