use tranche_protocol::{CampaignEvent, CampaignState, ErrorKind};
use tranche_protocol_testing::{demand_error_kind, test_account, SaleFixture, UNIT, WEEK};

/// Test time-driven failure when the low cap was missed
///
/// Should test:
/// - Collect strictly less than the low cap, then warp past the deadline
/// - touch() flips the state to NotCompleted and reports the shortfall total
/// - NotCompleted is terminal, so a follow-up touch() is refused outright
#[test]
fn test_touch_not_completed_below_low_cap() {
    let mut fixture = SaleFixture::default_sale();
    fixture.start_default_window();
    let investor = test_account(0x21);

    // low cap is 100e18; 50e18 at the flat tier stays short of it
    fixture.advance(3 * WEEK);
    fixture.try_invest(investor, 50 * UNIT).unwrap();
    let collected = fixture.campaign.collected_total();
    assert!(collected < fixture.campaign.low_cap_total());

    fixture.advance(WEEK + 1);
    let flipped = fixture.try_touch().unwrap();
    assert_eq!(flipped, Some(CampaignState::NotCompleted));
    assert_eq!(fixture.campaign.state(), CampaignState::NotCompleted);

    let events = fixture.campaign.drain_events();
    assert!(
        events.iter().any(|e| matches!(
            e,
            CampaignEvent::Completed {
                final_state: CampaignState::NotCompleted,
                collected_total,
            } if *collected_total == collected
        )),
        "missing completion event in {events:?}"
    );

    // terminal states answer every mutating call the same way
    demand_error_kind(
        fixture.try_touch(),
        ErrorKind::CampaignNotAcceptingFunds,
        "touch after NotCompleted",
    );
    fixture.assert_conserved();

    println!("✅ touch() closed the campaign as NotCompleted below the low cap");
}
