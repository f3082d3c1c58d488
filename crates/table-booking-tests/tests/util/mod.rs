use eyre::Result;
use table_booking_core::TableId;
use table_booking_ledger::Confirmation;
use table_booking_tests::TestCtx;

/// Reserves a table and tests that the reservation went through.
#[allow(unused)]
pub async fn reserve_ok(
    ctx: &TestCtx,
    table_id: TableId,
    customer_name: &str,
    guests: u32,
    time: &str,
) -> Result<Confirmation> {
    let response = ctx
        .api
        .reserve_table(table_id, customer_name, guests, time)
        .await?;
    assert_eq!(
        response.status, 201,
        "Reserving table {table_id} for {guests} guests must be answered with 201."
    );
    let confirmation = response.result?;
    assert_eq!(confirmation.reservation.table_id, table_id);
    assert!(
        !ctx.api.available_table_ids().await?.contains(&table_id),
        "After reserving table {table_id}, it must no longer be listed as available."
    );
    Ok(confirmation)
}
