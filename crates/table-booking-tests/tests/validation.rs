use eyre::Result;
use serde_json::json;
use table_booking_core::RequestKind;
use table_booking_tests::{RequestOptions, TestCtxBuilder};
use uuid::Uuid;

mod util;

const MISSING: &str = "Missing required reservation details.";
const INVALID_GUESTS: &str = "Guest count must be a positive number.";

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_missing_fields() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    let payloads = [
        json!({}),
        json!({ "customerName": "Ana", "guests": 2, "time": "19:00" }),
        json!({ "tableId": 1, "guests": 2, "time": "19:00" }),
        json!({ "tableId": 1, "customerName": "Ana", "time": "19:00" }),
        json!({ "tableId": 1, "customerName": "Ana", "guests": 2 }),
        json!({ "tableId": 1, "customerName": "", "guests": 2, "time": "19:00" }),
        json!({ "tableId": 1, "customerName": "Ana", "guests": 2, "time": "" }),
        json!({ "tableId": 1, "customerName": "Ana", "guests": null, "time": "19:00" }),
        // a zero party or table counts as not filled in
        json!({ "tableId": 1, "customerName": "Ana", "guests": 0, "time": "19:00" }),
        json!({ "tableId": 0, "customerName": "Ana", "guests": 2, "time": "19:00" }),
    ];

    for payload in &payloads {
        let err = ctx.api.reserve(payload).await?.expect_err()?;
        assert_eq!(err.status, 400, "{payload}");
        assert_eq!(err.message, MISSING, "{payload}");
    }

    assert!(ctx.api.get_reservations().await?.result?.is_empty());
    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_invalid_guest_count() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    for guests in [json!(-2), json!("3"), json!(2.5), json!([2]), json!(true)] {
        let payload = json!({ "tableId": 1, "customerName": "Ana", "guests": guests, "time": "19:00" });
        let err = ctx.api.reserve(&payload).await?.expect_err()?;
        assert_eq!(err.status, 400, "{payload}");
        assert_eq!(err.message, INVALID_GUESTS, "{payload}");
    }

    ctx.assert_consistent();
    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_unknown_table() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    let err = ctx
        .api
        .reserve_table(99, "Ana", 2, "19:00")
        .await?
        .expect_err()?;
    assert_eq!(err.status, 404);
    assert_eq!(err.message, "Table 99 not found.");

    let payload = json!({ "tableId": "patio", "customerName": "Ana", "guests": 2, "time": "19:00" });
    let err = ctx.api.reserve(&payload).await?.expect_err()?;
    assert_eq!(err.status, 404);
    assert_eq!(err.message, "Table patio not found.");

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_table_id_as_string() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    let payload = json!({ "tableId": "2", "customerName": "Ana", "guests": 2, "time": "19:00" });
    let confirmation = ctx.api.reserve(&payload).await?.result?;
    assert_eq!(confirmation.reservation.table_id, 2);
    assert_eq!(ctx.api.available_table_ids().await?, vec![1, 3, 4, 5]);

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_whole_floats_are_numbers() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    let payload = json!({ "tableId": 4.0, "customerName": "Ana", "guests": 2.0, "time": "19:00" });
    let response = ctx.api.reserve(&payload).await?;
    assert_eq!(response.status, 201);
    let confirmation = response.result?;
    assert_eq!(confirmation.reservation.table_id, 4);
    assert_eq!(confirmation.reservation.guests, 2);

    let err = ctx.api.update(1, &json!({ "guests": 3.0 })).await?.expect_err()?;
    assert_eq!(
        err.message,
        "Table 4 only has capacity for 2 guests. Cannot update to 3 guests."
    );

    ctx.assert_consistent();
    ctx.finish().await;
    Ok(())
}

/// Earlier checks win over later ones.
#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_validation_order() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    // missing fields before anything about the table
    let payload = json!({ "tableId": 99, "customerName": "Ana", "guests": 2 });
    let err = ctx.api.reserve(&payload).await?.expect_err()?;
    assert_eq!(err.message, MISSING);

    // guest count before table lookup
    let payload = json!({ "tableId": 99, "customerName": "Ana", "guests": -1, "time": "19:00" });
    let err = ctx.api.reserve(&payload).await?.expect_err()?;
    assert_eq!(err.message, INVALID_GUESTS);

    // occupancy before capacity
    ctx.api.reserve_table(4, "Ana", 2, "19:00").await?.result?;
    let err = ctx
        .api
        .reserve_table(4, "Bo", 10, "20:00")
        .await?
        .expect_err()?;
    assert_eq!(err.status, 400);
    assert_eq!(err.message, "Table 4 is already reserved.");

    ctx.assert_consistent();
    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_malformed_body() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    for body in ["{", "[1, 2]", r#"{"customerName": 7}"#] {
        let response = ctx
            .api
            .send_raw(RequestKind::Reserve, body, &RequestOptions::default())
            .await?;
        let err = response.expect_err()?;
        assert_eq!(err.status, 400, "{body}");
        assert!(err.message.starts_with("Malformed request body"), "{err}");
    }

    // an empty body is an empty object
    let err = ctx
        .api
        .send_raw(RequestKind::Reserve, "", &RequestOptions::default())
        .await?
        .expect_err()?;
    assert_eq!(err.message, MISSING);

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_request_id_is_echoed() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    let request_id = Uuid::new_v4();
    let options = RequestOptions {
        request_id: Some(request_id),
    };
    let response = ctx
        .api
        .send_raw(RequestKind::ListTables, "", &options)
        .await?;
    assert_eq!(response.status, 200);
    assert_eq!(response.request_id, request_id);

    ctx.finish().await;
    Ok(())
}
