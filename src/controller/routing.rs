use axum::routing::{get, post, put};
use axum::Router;

use super::*;

pub fn make_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(main_page))
        .route("/healthcheck", get(healthcheck))
        .route("/categories/", get(categories))
        .route("/categories/:slug/", get(category_detail))
        .route("/products/:kind/:slug/", get(product_detail))
        .route("/products/pizza/", post(save_pizza))
        .route("/products/beer/", post(save_beer))
        .route("/beer/", get(beer_list))
        .route("/beer/:id/", get(beer_detail))
        .route("/customers/", get(customers))
        .route("/cart/", get(cart_view))
        .route("/add-to-cart/:kind/:slug/", post(add_to_cart))
        .route("/remove-from-cart/:kind/:slug/", post(remove_from_cart))
        .route("/change-qty/:kind/:slug/", post(change_qty))
        .route("/checkout/", get(checkout))
        .route("/make-order/", post(make_order))
        .route("/payed-online-order/", post(payed_online_order))
        .route("/registration/", post(registration))
        .route("/login/", post(login))
        .route("/profile/", get(profile))
        .route("/orders/:id/status", put(set_order_status))
        .with_state(state)
}
