// Feature-view behavior over the scripted data fake.

mod common;

use anyhow::Result;
use serde_json::{json, Value};
use uuid::Uuid;

use common::FakeData;
use isls_portal_rust::error::PortalError;
use isls_portal_rust::remote::models::{EnrollmentStatus, Profile, ReviewStatus};
use isls_portal_rust::types::Role;
use isls_portal_rust::views::admin::{AdminOverview, AdminService};
use isls_portal_rust::views::alumni::AlumniService;
use isls_portal_rust::views::learning::LearningService;
use isls_portal_rust::views::mentoring::{MentoringService, NewSlot};
use isls_portal_rust::views::outputs::{NewOutput, OutputService};

fn learner(cohort: Option<&str>) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        role: Role::Learner,
        full_name: Some("Test Learner".to_string()),
        cohort_code: cohort.map(String::from),
        created_at: None,
    }
}

fn module_row(id: Uuid, title: &str, sort_order: i32) -> Value {
    json!({
        "id": id,
        "cohort_code": "2026-A",
        "title": title,
        "description": null,
        "content_url": null,
        "sort_order": sort_order,
    })
}

fn output_row(id: Uuid, user_id: Uuid, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "module_id": null,
        "reviewer_id": null,
        "title": title,
        "content": null,
        "review_status": status,
        "created_at": "2026-08-01T09:00:00Z",
        "updated_at": "2026-08-02T09:00:00Z",
    })
}

fn slot_row(id: Uuid, coach_id: Uuid) -> Value {
    json!({
        "id": id,
        "coach_id": coach_id,
        "start_at": "2026-09-01T10:00:00Z",
        "end_at": "2026-09-01T11:00:00Z",
        "location": "Room 4",
        "meeting_url": null,
        "capacity": 1,
    })
}

fn booking_row(id: Uuid, slot_id: Uuid, learner_id: Uuid, status: &str) -> Value {
    json!({
        "id": id,
        "slot_id": slot_id,
        "learner_id": learner_id,
        "status": status,
        "note": null,
        "created_at": "2026-08-20T12:00:00Z",
    })
}

#[tokio::test]
async fn learning_merges_enrollments_with_not_started_default() -> Result<()> {
    let profile = learner(Some("2026-A"));
    let m1 = Uuid::new_v4();
    let m2 = Uuid::new_v4();

    let data = FakeData::new();
    data.script_select("modules", vec![module_row(m1, "Week 1", 1), module_row(m2, "Week 2", 2)]);
    data.script_select(
        "enrollments",
        vec![json!({ "module_id": m1, "status": "in_progress", "progress": 40.0 })],
    );

    let service = LearningService::new(data.clone());
    let items = service.modules_with_progress(&profile).await?;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].enrollment.status, EnrollmentStatus::InProgress);
    assert_eq!(items[0].enrollment.progress, 40.0);
    assert_eq!(items[1].enrollment.status, EnrollmentStatus::NotStarted);
    assert_eq!(items[1].enrollment.progress, 0.0);

    let stats = LearningService::stats(&items);
    assert_eq!((stats.total, stats.in_progress, stats.not_started), (2, 1, 1));

    let pick = LearningService::now_playing(&items).unwrap();
    assert_eq!(pick.module.id, m1);

    // Enrollment query was scoped to the caller and the cohort's modules
    let queries = data.selects_for("enrollments");
    assert_eq!(queries.len(), 1);
    assert!(queries[0].filter_on("user_id").is_some());
    assert!(queries[0].filter_on("module_id").is_some());
    Ok(())
}

#[tokio::test]
async fn learning_without_cohort_reports_missing_cohort() -> Result<()> {
    let service = LearningService::new(FakeData::new());
    let err = service.modules_with_progress(&learner(None)).await.unwrap_err();
    assert!(matches!(err, PortalError::MissingCohort));
    Ok(())
}

#[tokio::test]
async fn continue_module_upserts_at_least_one_percent() -> Result<()> {
    let profile = learner(Some("2026-A"));
    let module_id = Uuid::new_v4();
    let data = FakeData::new();
    data.script_select("modules", vec![module_row(module_id, "Week 1", 1)]);
    data.script_select("enrollments", vec![]);

    let service = LearningService::new(data.clone());
    let items = service.modules_with_progress(&profile).await?;
    service.continue_module(profile.id, &items[0]).await?;

    let mutations = data.mutations_for("enrollments");
    assert_eq!(mutations.len(), 1);
    let (op, payload) = &mutations[0];
    assert_eq!(op, "upsert(user_id,module_id)");
    assert_eq!(payload["status"], "in_progress");
    assert!(payload["progress"].as_f64().unwrap() >= 1.0);
    assert_eq!(payload["user_id"], json!(profile.id));
    Ok(())
}

#[tokio::test]
async fn output_board_groups_by_stage() -> Result<()> {
    let profile = learner(Some("2026-A"));
    let author = profile.id;
    let data = FakeData::new();
    data.script_select("modules", vec![]);
    data.script_select(
        "outputs",
        vec![
            output_row(Uuid::new_v4(), author, "Pitch deck v1", "submitted"),
            output_row(Uuid::new_v4(), author, "Pitch deck v2", "reviewing"),
            output_row(Uuid::new_v4(), author, "Final deck", "approved"),
            output_row(Uuid::new_v4(), author, "Old draft", "revision_needed"),
        ],
    );

    let board = OutputService::new(data).board(&profile).await?;
    assert_eq!(board.draft.len(), 2);
    assert_eq!(board.review.len(), 1);
    assert_eq!(board.finished.len(), 1);
    Ok(())
}

#[tokio::test]
async fn submit_rejects_empty_titles_before_any_request() -> Result<()> {
    let data = FakeData::new();
    let service = OutputService::new(data.clone());
    let err = service
        .submit(&learner(Some("2026-A")), NewOutput { title: "   ".into(), module_id: None, content: None })
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::InvalidInput(_)));
    assert!(data.mutations_for("outputs").is_empty());
    Ok(())
}

#[tokio::test]
async fn submit_inserts_into_the_draft_column() -> Result<()> {
    let profile = learner(Some("2026-A"));
    let created_id = Uuid::new_v4();
    let data = FakeData::new();
    data.script_insert("outputs", vec![output_row(created_id, profile.id, "Pitch deck v1", "submitted")]);

    let created = OutputService::new(data.clone())
        .submit(&profile, NewOutput { title: "  Pitch deck v1  ".into(), module_id: None, content: Some("  ".into()) })
        .await?;

    assert_eq!(created.id, created_id);
    assert_eq!(created.review_status, ReviewStatus::Submitted);

    let (_, payload) = &data.mutations_for("outputs")[0];
    assert_eq!(payload["title"], "Pitch deck v1");
    assert_eq!(payload["review_status"], "submitted");
    assert_eq!(payload["cohort_code"], "2026-A");
    assert_eq!(payload["content"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn transitions_are_guarded_by_the_expected_status() -> Result<()> {
    let id = Uuid::new_v4();
    let data = FakeData::new();

    // Happy path: the update hits a row in the expected state
    OutputService::new(data.clone()).approve(id).await?;
    let (_, payload) = &data.mutations_for("outputs")[0];
    assert_eq!(payload["patch"]["review_status"], "approved");
    let filters = payload["filters"].as_array().unwrap();
    assert!(filters.iter().any(|f| f["column"] == "id"));
    assert!(filters.iter().any(|f| f["column"] == "review_status" && f["condition"] == "in.(reviewing)"));

    // Precondition lost: zero rows updated surfaces as a conflict
    let data = FakeData::new();
    data.script_update("outputs", vec![]);
    let err = OutputService::new(data).request_review(id).await.unwrap_err();
    assert!(matches!(err, PortalError::StateConflict(_)));
    Ok(())
}

#[tokio::test]
async fn claim_for_review_records_the_reviewer() -> Result<()> {
    let reviewer = Uuid::new_v4();
    let id = Uuid::new_v4();
    let data = FakeData::new();

    OutputService::new(data.clone()).claim_for_review(reviewer, id).await?;
    let (_, payload) = &data.mutations_for("outputs")[0];
    assert_eq!(payload["patch"]["review_status"], "reviewing");
    assert_eq!(payload["patch"]["reviewer_id"], json!(reviewer));
    Ok(())
}

#[tokio::test]
async fn review_queue_joins_author_and_reviewer_names() -> Result<()> {
    let author = Uuid::new_v4();
    let reviewer = Uuid::new_v4();
    let mut row = output_row(Uuid::new_v4(), author, "Pitch deck", "reviewing");
    row["reviewer_id"] = json!(reviewer);

    let data = FakeData::new();
    data.script_select("outputs", vec![row]);
    data.script_select(
        "profiles",
        vec![
            json!({ "id": author, "full_name": "Alice Author" }),
            json!({ "id": reviewer, "full_name": "Bob Reviewer" }),
        ],
    );

    let queue = OutputService::new(data.clone()).review_queue().await?;
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].author_name.as_deref(), Some("Alice Author"));
    assert_eq!(queue[0].reviewer_name.as_deref(), Some("Bob Reviewer"));

    // The name join asked only for the ids it saw
    let profile_query = &data.selects_for("profiles")[0];
    assert!(profile_query.filter_on("id").is_some());
    Ok(())
}

#[tokio::test]
async fn bookings_attach_their_slots_and_skip_cancelled_in_the_map() -> Result<()> {
    let learner_id = Uuid::new_v4();
    let coach_id = Uuid::new_v4();
    let slot_a = Uuid::new_v4();
    let slot_b = Uuid::new_v4();

    let data = FakeData::new();
    data.script_select(
        "mentoring_bookings",
        vec![
            booking_row(Uuid::new_v4(), slot_a, learner_id, "booked"),
            booking_row(Uuid::new_v4(), slot_b, learner_id, "cancelled"),
        ],
    );
    data.script_select("mentoring_slots", vec![slot_row(slot_a, coach_id)]);

    let service = MentoringService::new(data);
    let bookings = service.my_bookings(learner_id).await?;
    assert_eq!(bookings.len(), 2);
    assert!(bookings[0].slot.is_some());
    assert!(bookings[1].slot.is_none(), "slot row missing remotely stays None");

    let active = MentoringService::active_by_slot(&bookings);
    assert!(active.contains_key(&slot_a));
    assert!(!active.contains_key(&slot_b));
    Ok(())
}

#[tokio::test]
async fn booking_and_cancelling_guard_their_preconditions() -> Result<()> {
    let learner_id = Uuid::new_v4();
    let slot_id = Uuid::new_v4();
    let data = FakeData::new();
    data.script_insert("mentoring_bookings", vec![booking_row(Uuid::new_v4(), slot_id, learner_id, "booked")]);

    let service = MentoringService::new(data.clone());
    let booking = service.book(learner_id, slot_id, Some("  feedback on pricing  ".into())).await?;
    assert_eq!(booking.slot_id, slot_id);

    let (_, payload) = &data.mutations_for("mentoring_bookings")[0];
    assert_eq!(payload["status"], "booked");
    assert_eq!(payload["note"], "feedback on pricing");

    // Cancelling something that is not an active booking is a conflict
    let data = FakeData::new();
    data.script_update("mentoring_bookings", vec![]);
    let err = MentoringService::new(data).cancel(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PortalError::StateConflict(_)));
    Ok(())
}

#[tokio::test]
async fn slot_creation_validates_times_and_capacity() -> Result<()> {
    let coach_id = Uuid::new_v4();
    let data = FakeData::new();
    let service = MentoringService::new(data.clone());

    let start = chrono::Utc::now();
    let backwards = NewSlot {
        start_at: start,
        end_at: start - chrono::Duration::hours(1),
        location: None,
        meeting_url: None,
        capacity: 1,
    };
    assert!(matches!(service.create_slot(coach_id, backwards).await.unwrap_err(), PortalError::InvalidInput(_)));

    let empty = NewSlot {
        start_at: start,
        end_at: start + chrono::Duration::hours(1),
        location: None,
        meeting_url: None,
        capacity: 0,
    };
    assert!(matches!(service.create_slot(coach_id, empty).await.unwrap_err(), PortalError::InvalidInput(_)));
    assert!(data.mutations_for("mentoring_slots").is_empty());
    Ok(())
}

#[tokio::test]
async fn alumni_directory_search_and_intro_requests() -> Result<()> {
    let requester = Uuid::new_v4();
    let target = Uuid::new_v4();
    let data = FakeData::new();
    data.script_select(
        "alumni_directory",
        vec![json!({
            "id": target,
            "full_name": "Kim Jiwoo",
            "cohort_code": "2024-B",
            "organization": "Acme Robotics",
            "region": "Busan",
            "expertise_tags": ["hardware", "ml"],
            "headline": "Building robots",
        })],
    );
    data.script_insert(
        "alumni_links",
        vec![json!({
            "id": Uuid::new_v4(),
            "requester_id": requester,
            "target_alumni_id": target,
            "reason": "intro please",
            "status": "requested",
            "created_at": "2026-08-05T08:00:00Z",
        })],
    );

    let service = AlumniService::new(data.clone());
    let entries = service.directory().await?;
    assert_eq!(AlumniService::search(&entries, "robotics").len(), 1);
    assert_eq!(AlumniService::search(&entries, "nothing").len(), 0);

    let link = service.request_intro(requester, target, Some("intro please".into())).await?;
    assert_eq!(link.target_alumni_id, target);
    let (_, payload) = &data.mutations_for("alumni_links")[0];
    assert_eq!(payload["status"], "requested");
    Ok(())
}

#[tokio::test]
async fn admin_overview_counts_all_four_tables() -> Result<()> {
    let data = FakeData::new();
    data.script_count("profiles", 12);
    data.script_count("modules", 8);
    data.script_count("outputs", 31);
    data.script_count("mentoring_bookings", 5);

    let overview = AdminService::new(data).overview().await?;
    assert_eq!(overview, AdminOverview { users: 12, modules: 8, outputs: 31, bookings: 5 });
    Ok(())
}

#[tokio::test]
async fn admin_profile_patches_and_not_found() -> Result<()> {
    let id = Uuid::new_v4();
    let data = FakeData::new();
    let service = AdminService::new(data.clone());

    service.set_role(id, Role::Coach).await?;
    service.set_cohort(id, None).await?;
    service.set_cohort(id, Some("  2026-A ".into())).await?;

    let mutations = data.mutations_for("profiles");
    assert_eq!(mutations[0].1["patch"]["role"], "coach");
    assert_eq!(mutations[1].1["patch"]["cohort_code"], Value::Null);
    assert_eq!(mutations[2].1["patch"]["cohort_code"], "2026-A");

    let data = FakeData::new();
    data.script_update("profiles", vec![]);
    let err = AdminService::new(data).set_role(id, Role::Admin).await.unwrap_err();
    assert!(matches!(err, PortalError::NotFound(_)));
    Ok(())
}
