/// Integration tests for the form instance endpoints

mod common;

use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use common::TestContext;
use flowgate_shared::models::FormInstance;

fn instance(id: &str, definition: &str, minutes: i64, tenant: &str) -> FormInstance {
    let mut instance = FormInstance::new(definition);
    instance.id = id.to_string();
    instance.submitted_date =
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
    instance.tenant_id = tenant.to_string();
    instance
}

async fn seed(ctx: &TestContext) {
    let mut leave = instance("fi-1", "leave-request:1", 30, "acme");
    leave.task_id = Some("task-1".to_string());
    leave.process_instance_id = Some("proc-1".to_string());
    leave.submitted_by = Some("kermit".to_string());
    ctx.seed_form_instance(leave).await;

    let mut expense = instance("fi-2", "expense-claim:3", 10, "");
    expense.task_id = Some("task-2".to_string());
    expense.submitted_by = Some("piggy".to_string());
    ctx.seed_form_instance(expense).await;

    let mut leave_again = instance("fi-3", "leave-request:2", 20, "globex");
    leave_again.process_instance_id = Some("proc-1".to_string());
    leave_again.submitted_by = Some("kermit".to_string());
    ctx.seed_form_instance(leave_again).await;
}

#[tokio::test]
async fn test_list_defaults_to_submitted_date() {
    let ctx = TestContext::new();
    seed(&ctx).await;

    let (status, body) = ctx.get("/form/form-instances").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(TestContext::ids(&body), vec!["fi-2", "fi-3", "fi-1"]);
    assert_eq!(body["total"], 3);
    assert_eq!(body["sort"], "submittedDate");
    assert_eq!(body["order"], "asc");
    assert_eq!(body["data"][0]["formDefinitionId"], "expense-claim:3");
    assert!(body["data"][0]["tenantId"].is_null());
    assert_eq!(body["data"][1]["tenantId"], "globex");
}

#[tokio::test]
async fn test_list_with_filters() {
    let ctx = TestContext::new();
    seed(&ctx).await;

    let (_, body) = ctx.get("/form/form-instances?processInstanceId=proc-1").await;
    assert_eq!(TestContext::ids(&body), vec!["fi-3", "fi-1"]);

    let (_, body) = ctx
        .get("/form/form-instances?formDefinitionIdLike=leave%25&submittedBy=kermit&sort=submittedDate&order=desc")
        .await;
    assert_eq!(TestContext::ids(&body), vec!["fi-1", "fi-3"]);

    let (_, body) = ctx.get("/form/form-instances?taskIdLike=task-_").await;
    assert_eq!(body["total"], 2);

    let (_, body) = ctx.get("/form/form-instances?id=fi-2").await;
    assert_eq!(TestContext::ids(&body), vec!["fi-2"]);
}

#[tokio::test]
async fn test_list_by_tenant() {
    let ctx = TestContext::new();
    seed(&ctx).await;

    let (_, body) = ctx.get("/form/form-instances?withoutTenantId=true").await;
    assert_eq!(TestContext::ids(&body), vec!["fi-2"]);

    let (_, body) = ctx.get("/form/form-instances?tenantIdLike=%25e%25").await;
    assert_eq!(TestContext::ids(&body), vec!["fi-3", "fi-1"]);

    let (_, body) = ctx.get("/form/form-instances?sort=tenantId").await;
    assert_eq!(TestContext::ids(&body), vec!["fi-2", "fi-1", "fi-3"]);

    let (status, _) = ctx.get("/form/form-instances?withoutTenantId=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_paging() {
    let ctx = TestContext::new();
    seed(&ctx).await;

    let (status, body) = ctx.get("/form/form-instances?start=1&size=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(TestContext::ids(&body), vec!["fi-3"]);
    assert_eq!(body["total"], 3);
    assert_eq!(body["size"], 1);

    let (status, _) = ctx.get("/form/form-instances?sort=formDefinitionId").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_form_instance() {
    let ctx = TestContext::new();
    seed(&ctx).await;

    let (status, body) = ctx.get("/form/form-instances/fi-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["taskId"], "task-1");
    assert_eq!(body["url"], "/form/form-instances/fi-1");

    let (status, body) = ctx.get("/form/form-instances/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "Could not find a form instance with id 'missing'."
    );
}
