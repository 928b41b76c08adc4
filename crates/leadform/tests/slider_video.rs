//! Slider and video page objects against the simulated site

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use leadform::prelude::*;

const BASE: &str = "https://site.test";

fn config() -> SuiteConfig {
    SuiteConfig::new()
        .with_base_url(BASE)
        .with_screenshot_on_failure(false)
}

fn driver(behavior: SiteBehavior) -> Arc<MockDriver<SimulatedLeadSite>> {
    Arc::new(MockDriver::new(SimulatedLeadSite::new(BASE, behavior)))
}

async fn open_slider(behavior: SiteBehavior) -> Slider {
    let slider = Slider::new(driver(behavior), &config()).unwrap();
    slider.open().await.unwrap();
    slider
}

#[tokio::test(start_paused = true)]
async fn test_next_wraps_from_last_to_first() {
    let slider = open_slider(SiteBehavior::default()).await;
    slider.navigate_to_slide(EXPECTED_SLIDE_COUNT - 1).await.unwrap();
    assert_eq!(slider.click_next().await.unwrap(), 0);
    slider.expect_active_index(0).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_previous_wraps_from_first_to_last() {
    let slider = open_slider(SiteBehavior::default()).await;
    assert_eq!(slider.click_previous().await.unwrap(), EXPECTED_SLIDE_COUNT - 1);
    assert_eq!(slider.active_index().await.unwrap(), (EXPECTED_SLIDE_COUNT - 1) as i64);
}

#[tokio::test(start_paused = true)]
async fn test_navigate_out_of_range_is_rejected() {
    let slider = open_slider(SiteBehavior::default()).await;
    let err = slider
        .navigate_to_slide(EXPECTED_SLIDE_COUNT)
        .await
        .unwrap_err();
    assert!(matches!(err, LeadformError::InvalidDefinition { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_wrong_slide_count_is_a_mismatch() {
    let slider = open_slider(SiteBehavior::default().with_slides(5)).await;
    let err = slider
        .expect_slide_count(EXPECTED_SLIDE_COUNT)
        .await
        .unwrap_err();
    assert!(err.is_validation_failure());
}

#[tokio::test(start_paused = true)]
async fn test_empty_slider_cannot_advance() {
    let slider = open_slider(SiteBehavior::default().with_slides(0)).await;
    assert_eq!(slider.active_index().await.unwrap(), -1);
    assert!(slider.click_next().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_videos_visible() {
    let videos = Videos::new(driver(SiteBehavior::default()), &config());
    videos.open().await.unwrap();
    assert_eq!(videos.count().await.unwrap(), 2);
    videos.expect_all_visible().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_missing_videos_fail() {
    let videos = Videos::new(driver(SiteBehavior::default().with_videos(0)), &config());
    videos.open().await.unwrap();
    let err = videos.expect_all_visible().await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::OutcomeMismatch);
}

#[tokio::test(start_paused = true)]
async fn test_slider_and_video_groups_pass() {
    let data = TestData::standard();
    let scenarios = standard_catalogue(&data);
    let runner = SuiteRunner::new(
        config(),
        data,
        Arc::new(SimulatedSessionFactory::new(BASE, SiteBehavior::default())),
    );

    let slider = runner.with_grep(Some("slider".to_string()));
    let reporter = slider.run(&scenarios).await;
    assert_eq!(reporter.total_count(), 8);
    assert_eq!(reporter.count(ScenarioOutcome::Passed), 8);
}
