use axum_restaurant_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        cart::AddToCartRequest,
        items::{CreateItemRequest, UpdateItemRequest},
        reviews::AddReviewRequest,
    },
    entity::users::ActiveModel as UserActive,
    error::AppError,
    middleware::auth::AuthUser,
    services::{cart_service, item_service, review_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: the item owner manages the catalog while a customer
// posts reviews; deleting the item sweeps its lines and reviews away.
#[tokio::test]
async fn menu_crud_and_review_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let state = setup_state(&database_url).await?;

    let owner_id = create_user(&state, true, "owner@example.com").await?;
    let diner_id = create_user(&state, false, "diner@example.com").await?;
    let owner = AuthUser {
        user_id: owner_id,
        operator: true,
    };
    let diner = AuthUser {
        user_id: diner_id,
        operator: false,
    };

    let created = item_service::create_item(
        &state,
        &owner,
        CreateItemRequest {
            title: "Garlic Bread".into(),
            slug: Some("garlic-bread".into()),
            description: None,
            price: 450,
            pieces: Some(4),
            instructions: Some("Serve warm".into()),
            image: None,
            label: None,
            label_colour: None,
        },
    )
    .await?;
    let item = created.data.unwrap();

    // Slug collisions are rejected up front.
    let dup = item_service::create_item(
        &state,
        &owner,
        CreateItemRequest {
            title: "Another Bread".into(),
            slug: Some("garlic-bread".into()),
            description: None,
            price: 100,
            pieces: None,
            instructions: None,
            image: None,
            label: None,
            label_colour: None,
        },
    )
    .await;
    assert!(matches!(dup, Err(AppError::Validation(_))));

    // Unknown labels never land on the menu, and neither do negative prices.
    let bad_label = item_service::create_item(
        &state,
        &owner,
        CreateItemRequest {
            title: "Chili Fries".into(),
            slug: None,
            description: None,
            price: 300,
            pieces: None,
            instructions: None,
            image: None,
            label: Some("spicy".into()),
            label_colour: None,
        },
    )
    .await;
    assert!(matches!(bad_label, Err(AppError::Validation(_))));

    let negative = item_service::create_item(
        &state,
        &owner,
        CreateItemRequest {
            title: "Free Lunch".into(),
            slug: None,
            description: None,
            price: -1,
            pieces: None,
            instructions: None,
            image: None,
            label: None,
            label_colour: None,
        },
    )
    .await;
    assert!(matches!(negative, Err(AppError::Validation(_))));

    let menu = item_service::list_menu(&state).await?.data.unwrap();
    assert_eq!(menu.items.len(), 1);

    // The owner reshapes the item.
    let updated = item_service::update_item(
        &state,
        &owner,
        "garlic-bread",
        UpdateItemRequest {
            title: None,
            slug: None,
            description: Some("Now with extra garlic".into()),
            price: Some(500),
            pieces: None,
            instructions: None,
            image: None,
            label: Some("best-seller".into()),
            label_colour: Some("danger".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.price, 500);
    assert_eq!(updated.label.as_deref(), Some("best-seller"));

    // Moving the slug frees the old one.
    item_service::update_item(
        &state,
        &owner,
        "garlic-bread",
        UpdateItemRequest {
            title: None,
            slug: Some("cheesy-garlic-bread".into()),
            description: None,
            price: None,
            pieces: None,
            instructions: None,
            image: None,
            label: None,
            label_colour: None,
        },
    )
    .await?;
    let old = item_service::menu_detail(&state, "garlic-bread").await;
    assert!(matches!(old, Err(AppError::NotFound)));
    let renamed = item_service::menu_detail(&state, "cheesy-garlic-bread")
        .await?
        .data
        .unwrap();
    assert_eq!(renamed.item.id, item.id);

    // Blank review text is rejected; a real one lands with the item slug.
    let empty = review_service::add_review(
        &state,
        &diner,
        "cheesy-garlic-bread",
        AddReviewRequest {
            review: "   ".into(),
        },
    )
    .await;
    assert!(matches!(empty, Err(AppError::Validation(_))));

    let posted = review_service::add_review(
        &state,
        &diner,
        "cheesy-garlic-bread",
        AddReviewRequest {
            review: "Lovely crust".into(),
        },
    )
    .await?;
    assert_eq!(posted.message, "Thanks for your review!");
    let review = posted.data.unwrap();
    assert_eq!(review.slug, "cheesy-garlic-bread");

    // The detail view carries only the newest seven reviews.
    for n in 0..7 {
        review_service::add_review(
            &state,
            &diner,
            "cheesy-garlic-bread",
            AddReviewRequest {
                review: format!("More praise {n}"),
            },
        )
        .await?;
    }
    let detail = item_service::menu_detail(&state, "cheesy-garlic-bread")
        .await?
        .data
        .unwrap();
    assert_eq!(detail.reviews.len(), 7);

    // Deleting the item takes its cart lines and reviews with it.
    cart_service::add_to_cart(
        &state,
        &diner,
        AddToCartRequest {
            slug: "cheesy-garlic-bread".into(),
        },
    )
    .await?;
    item_service::delete_item(&state, &owner, "cheesy-garlic-bread").await?;
    let gone = item_service::menu_detail(&state, "cheesy-garlic-bread").await;
    assert!(matches!(gone, Err(AppError::NotFound)));
    let cart = cart_service::view_cart(&state, &diner).await?.data.unwrap();
    assert!(cart.lines.is_empty());

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE reviews, cart_items, audit_logs, items, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn create_user(state: &AppState, is_operator: bool, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        is_operator: Set(is_operator),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
