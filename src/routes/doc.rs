use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartLineDto, CartView},
        items::{CreateItemRequest, ItemDetail, ItemList, UpdateItemRequest},
        operator::{
            DashboardSummary, FulfilmentLineDto, FulfilmentList, ItemOrderCount,
            UpdateStatusRequest, UpdateStatusResponse,
        },
        orders::{OrderDetails, PlaceOrderResponse, PlacedLineDto},
        reviews::AddReviewRequest,
    },
    models::{CartLine, Item, Review, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, health, items, menu, operator, orders},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        menu::list_menu,
        menu::menu_detail,
        menu::add_review,
        items::create_item,
        items::update_item,
        items::delete_item,
        cart::view_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        orders::place_order,
        orders::order_details,
        operator::pending_orders,
        operator::delivered_orders,
        operator::update_status,
        operator::dashboard,
        operator::list_items
    ),
    components(
        schemas(
            User,
            Item,
            CartLine,
            Review,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateItemRequest,
            UpdateItemRequest,
            ItemList,
            ItemDetail,
            AddToCartRequest,
            CartLineDto,
            CartView,
            PlacedLineDto,
            OrderDetails,
            PlaceOrderResponse,
            AddReviewRequest,
            UpdateStatusRequest,
            UpdateStatusResponse,
            FulfilmentLineDto,
            FulfilmentList,
            ItemOrderCount,
            DashboardSummary,
            Meta,
            ApiResponse<Item>,
            ApiResponse<ItemList>,
            ApiResponse<ItemDetail>,
            ApiResponse<CartView>,
            ApiResponse<OrderDetails>,
            ApiResponse<FulfilmentList>,
            ApiResponse<DashboardSummary>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Menu", description = "Public menu and review endpoints"),
        (name = "Items", description = "Item management endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Operator", description = "Fulfilment endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
