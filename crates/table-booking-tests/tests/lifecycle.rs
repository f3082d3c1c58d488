use std::collections::HashSet;

use eyre::Result;
use table_booking_core::{RequestKind, TableSpec};
use table_booking_tests::{RequestOptions, TestCtxBuilder};
use util::reserve_ok;

mod util;

/// Ids keep growing even when earlier reservations are gone.
#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_ids_are_never_reused() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    let mut issued = Vec::new();
    for round in 0..4 {
        for table in [1, 2, 3] {
            let name = format!("guest {round}/{table}");
            issued.push(reserve_ok(&ctx, table, &name, 2, "19:00").await?.reservation.id);
        }
        for id in &issued[issued.len() - 3..] {
            ctx.api.cancel(*id).await?.result?;
        }
    }

    assert!(
        issued.windows(2).all(|pair| pair[0] < pair[1]),
        "Reservation ids must be strictly increasing: {issued:?}"
    );
    assert_eq!(issued.iter().collect::<HashSet<_>>().len(), issued.len());
    assert_eq!(*issued.last().unwrap(), 12);

    let next = reserve_ok(&ctx, 5, "late", 1, "23:00").await?;
    assert_eq!(next.reservation.id, 13);

    ctx.assert_consistent();
    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_cancel_frees_only_its_table() -> Result<()> {
    let ctx = TestCtxBuilder::new().build().await?;

    let a = reserve_ok(&ctx, 1, "Ana", 2, "19:00").await?.reservation;
    let b = reserve_ok(&ctx, 2, "Bo", 2, "19:00").await?.reservation;
    let c = reserve_ok(&ctx, 3, "Cy", 2, "19:00").await?.reservation;

    ctx.api.cancel(b.id).await?.result?;
    assert_eq!(ctx.api.available_table_ids().await?, vec![2, 4, 5]);
    assert_eq!(ctx.api.get_reservations().await?.result?, vec![a, c]);

    let err = ctx.api.cancel(b.id).await?.expect_err()?;
    assert_eq!(err.status, 404);

    // `DELETE /api/cancel/abc`
    let err = ctx
        .api
        .send_raw(RequestKind::Cancel(None), "", &RequestOptions::default())
        .await?
        .expect_err()?;
    assert_eq!(err.status, 404);
    assert_eq!(err.message, "Reservation not found.");

    ctx.assert_consistent();
    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_all_tables_taken() -> Result<()> {
    let ctx = TestCtxBuilder::new()
        .with_tables([TableSpec::new(10, 2), TableSpec::new(20, 12)])
        .build()
        .await?;

    assert_eq!(ctx.api.available_table_ids().await?, vec![10, 20]);
    reserve_ok(&ctx, 20, "Banquet", 12, "18:00").await?;
    reserve_ok(&ctx, 10, "Couple", 2, "18:30").await?;
    assert!(ctx.api.available_table_ids().await?.is_empty());

    let err = ctx
        .api
        .reserve_table(1, "Ana", 2, "19:00")
        .await?
        .expect_err()?;
    assert_eq!(err.status, 404);

    ctx.assert_consistent();
    ctx.finish().await;
    Ok(())
}
