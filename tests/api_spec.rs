use axum::http::StatusCode;
use axum_test::TestServer;
use sitetrack::api::create_router;
use sitetrack::db::Database;
use sitetrack::models::*;
use sitetrack::progress::PhaseWeight;
use uuid::Uuid;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_project(server: &TestServer, phase: Phase, status: ProjectStatus) -> Project {
    server
        .post("/api/v1/projects")
        .json(&CreateProjectInput {
            name: "Test Project".to_string(),
            description: None,
            current_phase: Some(phase),
            status: Some(status),
        })
        .await
        .json::<Project>()
}

async fn create_task(
    server: &TestServer,
    project_id: Uuid,
    phase: Phase,
    priority: Option<TaskPriority>,
    status: TaskStatus,
) -> Task {
    server
        .post(&format!("/api/v1/projects/{}/tasks", project_id))
        .json(&CreateTaskInput {
            title: "Task".to_string(),
            description: None,
            status: Some(status),
            priority,
            phase: Some(phase),
        })
        .await
        .json::<Task>()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn returns_ok() {
        let server = setup();
        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
    }
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn create_returns_created() {
        let server = setup();

        let response = server
            .post("/api/v1/projects")
            .json(&CreateProjectInput {
                name: "Harbour Library".to_string(),
                description: None,
                current_phase: None,
                status: None,
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let project: Project = response.json();
        assert_eq!(project.current_phase, Phase::Concept);
        assert_eq!(project.progress_percentage, 0);
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let server = setup();

        let response = server
            .post("/api/v1/projects")
            .json(&CreateProjectInput {
                name: "  ".to_string(),
                description: None,
                current_phase: None,
                status: None,
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_returns_404_for_unknown_project() {
        let server = setup();
        let response = server
            .get(&format!("/api/v1/projects/{}", Uuid::new_v4()))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn update_changes_status() {
        let server = setup();
        let project = create_project(&server, Phase::Concept, ProjectStatus::Planning).await;

        let response = server
            .put(&format!("/api/v1/projects/{}", project.id))
            .json(&UpdateProjectInput {
                status: Some(ProjectStatus::Active),
                ..Default::default()
            })
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Project>().status, ProjectStatus::Active);
    }

    #[tokio::test]
    async fn delete_returns_no_content_then_404() {
        let server = setup();
        let project = create_project(&server, Phase::Concept, ProjectStatus::Planning).await;

        server
            .delete(&format!("/api/v1/projects/{}", project.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .assert_status_not_found();
    }
}

mod tasks {
    use super::*;

    #[tokio::test]
    async fn create_on_unknown_project_is_404() {
        let server = setup();

        let response = server
            .post(&format!("/api/v1/projects/{}/tasks", Uuid::new_v4()))
            .json(&CreateTaskInput {
                title: "Orphan".to_string(),
                description: None,
                status: None,
                priority: None,
                phase: None,
            })
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn list_returns_project_tasks() {
        let server = setup();
        let project = create_project(&server, Phase::Concept, ProjectStatus::Active).await;
        create_task(&server, project.id, Phase::Concept, None, TaskStatus::Pending).await;
        create_task(&server, project.id, Phase::Design, None, TaskStatus::Pending).await;

        let response = server
            .get(&format!("/api/v1/projects/{}/tasks", project.id))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Task>>().len(), 2);
    }

    #[tokio::test]
    async fn status_change_advances_phase_and_updates_progress() {
        let server = setup();
        let project = create_project(&server, Phase::Concept, ProjectStatus::Active).await;
        let task = create_task(
            &server,
            project.id,
            Phase::Concept,
            Some(TaskPriority::High),
            TaskStatus::InProgress,
        )
        .await;

        let response = server
            .put(&format!("/api/v1/tasks/{}", task.id))
            .json(&UpdateTaskInput {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            })
            .await;

        response.assert_status_ok();
        let body: UpdateTaskResponse = response.json();
        assert_eq!(body.task.status, TaskStatus::Completed);
        assert_eq!(body.project_progress, Some(10));

        let project: Project = server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .json();
        assert_eq!(project.current_phase, Phase::Design);
        assert_eq!(project.progress_percentage, 10);

        let activities: Vec<Activity> = server
            .get(&format!("/api/v1/projects/{}/activities", project.id))
            .await
            .json();
        assert_eq!(activities.len(), 2);

        let history: Vec<ProgressEntry> = server
            .get(&format!("/api/v1/projects/{}/progress/history", project.id))
            .await
            .json();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].progress_percentage, 10);
    }

    #[tokio::test]
    async fn edit_without_status_change_leaves_progress_alone() {
        let server = setup();
        let project = create_project(&server, Phase::Concept, ProjectStatus::Active).await;
        let task = create_task(&server, project.id, Phase::Concept, None, TaskStatus::Pending).await;

        let response = server
            .put(&format!("/api/v1/tasks/{}", task.id))
            .json(&UpdateTaskInput {
                title: Some("Renamed".to_string()),
                ..Default::default()
            })
            .await;

        response.assert_status_ok();
        let body: UpdateTaskResponse = response.json();
        assert_eq!(body.task.title, "Renamed");
        assert_eq!(body.project_progress, None);

        let activities: Vec<Activity> = server
            .get(&format!("/api/v1/projects/{}/activities", project.id))
            .await
            .json();
        assert!(activities.is_empty());
    }

    #[tokio::test]
    async fn update_unknown_task_is_404() {
        let server = setup();
        let response = server
            .put(&format!("/api/v1/tasks/{}", Uuid::new_v4()))
            .json(&UpdateTaskInput::default())
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_returns_no_content() {
        let server = setup();
        let project = create_project(&server, Phase::Concept, ProjectStatus::Active).await;
        let task = create_task(&server, project.id, Phase::Concept, None, TaskStatus::Pending).await;

        server
            .delete(&format!("/api/v1/tasks/{}", task.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/v1/tasks/{}", task.id))
            .await
            .assert_status_not_found();
    }
}

mod progress {
    use super::*;

    #[tokio::test]
    async fn snapshot_credits_earlier_phases() {
        let server = setup();
        let project = create_project(&server, Phase::Execution, ProjectStatus::Active).await;
        create_task(&server, project.id, Phase::Execution, None, TaskStatus::Pending).await;

        let response = server
            .get(&format!("/api/v1/projects/{}/progress", project.id))
            .await;

        response.assert_status_ok();
        let snapshot: ProjectProgress = response.json();
        assert_eq!(snapshot.current_phase, Phase::Execution);
        assert_eq!(snapshot.phase_progress, 0);
        assert_eq!(snapshot.progress, 45);
    }

    #[tokio::test]
    async fn snapshot_for_unknown_project_is_404() {
        let server = setup();
        server
            .get(&format!("/api/v1/projects/{}/progress", Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn sync_completes_finished_active_project() {
        let server = setup();
        let project = create_project(&server, Phase::Handover, ProjectStatus::Active).await;
        create_task(&server, project.id, Phase::Handover, None, TaskStatus::Completed).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/sync", project.id))
            .await;

        response.assert_status_ok();
        let report: SyncReport = response.json();
        assert_eq!(report.progress, 100);
        assert!(report.completed);

        let project: Project = server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .json();
        assert_eq!(project.status, ProjectStatus::Completed);
        assert_eq!(project.current_phase, Phase::Handover);
    }

    #[tokio::test]
    async fn sync_unknown_project_is_404() {
        let server = setup();
        server
            .post(&format!("/api/v1/projects/{}/sync", Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn phases_lists_catalog() {
        let server = setup();
        let response = server.get("/api/v1/phases").await;

        response.assert_status_ok();
        let phases: Vec<PhaseWeight> = response.json();
        assert_eq!(phases.len(), 7);
        assert_eq!(phases[3].phase, Phase::Execution);
        assert_eq!(phases[3].weight, 45);
        assert_eq!(phases.iter().map(|p| p.weight).sum::<u32>(), 100);
    }
}

mod templates {
    use super::*;

    #[tokio::test]
    async fn apply_creates_phase_tasks() {
        let server = setup();
        let project = create_project(&server, Phase::Concept, ProjectStatus::Active).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/phases/execution/template", project.id))
            .await;

        response.assert_status(StatusCode::CREATED);
        let tasks: Vec<Task> = response.json();
        assert!(!tasks.is_empty());
        assert!(tasks.iter().all(|t| t.phase == Some(Phase::Execution)));
    }

    #[tokio::test]
    async fn unknown_phase_is_rejected() {
        let server = setup();
        let project = create_project(&server, Phase::Concept, ProjectStatus::Active).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/phases/demolished/template", project.id))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
