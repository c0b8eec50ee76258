#[cfg(test)]
mod integration_tests {
    use crate::test_utils::test_utils::setup_test_app;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn setup_server() -> TestServer {
        let app = setup_test_app().await;
        TestServer::new(app).expect("Failed to start test server")
    }

    async fn create_user(server: &TestServer, username: &str, email: Option<&str>) -> i64 {
        let response = server
            .post("/api/v1/users")
            .json(&json!({ "username": username, "email": email }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["payload"]["id"].as_i64().expect("user id")
    }

    async fn create_category(server: &TestServer, name: &str, require_acceptance: bool) -> i64 {
        let response = server
            .post("/api/v1/categories")
            .json(&json!({ "name": name, "require_acceptance": require_acceptance }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["payload"]["id"].as_i64().expect("category id")
    }

    async fn create_asset(server: &TestServer, tag: &str, category_id: i64) -> i64 {
        let response = server
            .post("/api/v1/assets")
            .json(&json!({
                "asset_tag": tag,
                "serial": format!("SN-{tag}"),
                "category_id": category_id,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["payload"]["id"].as_i64().expect("asset id")
    }

    async fn create_license(server: &TestServer, name: &str, seats: i64, reassignable: bool) -> i64 {
        let response = server
            .post("/api/v1/licenses")
            .json(&json!({ "name": name, "seats": seats, "reassignable": reassignable }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["payload"]["id"].as_i64().expect("license id")
    }

    async fn seat_ids(server: &TestServer, license_id: i64) -> Vec<i64> {
        let response = server
            .get(&format!("/api/v1/licenses/{license_id}/seats"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        body["payload"]["rows"]
            .as_array()
            .expect("seat rows")
            .iter()
            .map(|row| row["id"].as_i64().expect("seat id"))
            .collect()
    }

    async fn patch_seat(server: &TestServer, license_id: i64, seat_id: i64, body: Value) -> Value {
        let response = server
            .patch(&format!("/api/v1/licenses/{license_id}/seats/{seat_id}"))
            .json(&body)
            .await;
        response.assert_status(StatusCode::OK);
        response.json()
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = setup_server().await;

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let server = setup_server().await;

        let user_id = create_user(&server, "testuser", Some("test@example.com")).await;

        let response = server.get(&format!("/api/v1/users/{user_id}")).await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "success");
        assert_eq!(body["messages"], "User retrieved successfully");
        assert_eq!(body["payload"]["username"], "testuser");
        assert_eq!(body["payload"]["email"], "test@example.com");
    }

    #[tokio::test]
    async fn test_create_user_with_invalid_email() {
        let server = setup_server().await;

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "username": "broken", "email": "not-an-email" }))
            .await;

        // Validation failures use the error envelope, not an HTTP error.
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert!(body["messages"]["email"][0]
            .as_str()
            .expect("email message")
            .contains("valid email"));
        assert!(body["payload"].is_null());
    }

    #[tokio::test]
    async fn test_get_missing_user_is_404() {
        let server = setup_server().await;

        let response = server.get("/api/v1/users/9999").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deleted_user_disappears_from_listing() {
        let server = setup_server().await;

        let user_id = create_user(&server, "leaver", None).await;
        create_user(&server, "stayer", None).await;

        let response = server.delete(&format!("/api/v1/users/{user_id}")).await;
        response.assert_status(StatusCode::OK);

        let response = server.get("/api/v1/users").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let usernames: Vec<&str> = body["payload"]
            .as_array()
            .expect("users")
            .iter()
            .map(|u| u["username"].as_str().expect("username"))
            .collect();
        assert_eq!(usernames, vec!["stayer"]);

        let response = server.get(&format!("/api/v1/users/{user_id}")).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_location_crud() {
        let server = setup_server().await;

        let response = server
            .post("/api/v1/locations")
            .json(&json!({ "name": "Warehouse", "city": "Springfield" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let location_id = body["payload"]["id"].as_i64().expect("location id");

        let response = server
            .put(&format!("/api/v1/locations/{location_id}"))
            .json(&json!({ "address": "2 Depot Road" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["payload"]["address"], "2 Depot Road");
        assert_eq!(body["payload"]["name"], "Warehouse");

        let response = server
            .delete(&format!("/api/v1/locations/{location_id}"))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server.get(&format!("/api/v1/locations/{location_id}")).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_license_creation_provisions_seats() {
        let server = setup_server().await;

        let license_id = create_license(&server, "Office Suite", 3, true).await;

        let response = server
            .get(&format!("/api/v1/licenses/{license_id}/seats"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["payload"]["total"], 3);
        assert_eq!(body["payload"]["rows"].as_array().expect("rows").len(), 3);
        for row in body["payload"]["rows"].as_array().expect("rows") {
            assert!(row["assigned_to"].is_null());
            assert!(row["asset_id"].is_null());
            assert_eq!(row["unreassignable_seat"], false);
        }

        // Creation leaves a create and an add-seats trail.
        let response = server.get("/api/v1/reports/activity").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let actions: Vec<&str> = body["payload"]
            .as_array()
            .expect("activity")
            .iter()
            .map(|e| e["action_type"].as_str().expect("action"))
            .collect();
        assert!(actions.contains(&"create"));
        assert!(actions.contains(&"add seats"));
    }

    #[tokio::test]
    async fn test_seat_listing_filters_and_pagination() {
        let server = setup_server().await;

        let user_id = create_user(&server, "holder", None).await;
        let license_id = create_license(&server, "Office Suite", 3, true).await;
        let seats = seat_ids(&server, license_id).await;

        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": user_id }),
        )
        .await;
        assert_eq!(body["status"], "success");

        let response = server
            .get(&format!(
                "/api/v1/licenses/{license_id}/seats?status=available"
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["payload"]["total"], 2);

        let response = server
            .get(&format!(
                "/api/v1/licenses/{license_id}/seats?status=assigned"
            ))
            .await;
        let body: Value = response.json();
        assert_eq!(body["payload"]["total"], 1);
        assert_eq!(body["payload"]["rows"][0]["assigned_to"], user_id);

        // Pagination: page size 2 leaves one row on the second page.
        let response = server
            .get(&format!("/api/v1/licenses/{license_id}/seats?limit=2"))
            .await;
        let body: Value = response.json();
        assert_eq!(body["payload"]["total"], 3);
        assert_eq!(body["payload"]["rows"].as_array().expect("rows").len(), 2);

        let response = server
            .get(&format!(
                "/api/v1/licenses/{license_id}/seats?limit=2&offset=2"
            ))
            .await;
        let body: Value = response.json();
        assert_eq!(body["payload"]["rows"].as_array().expect("rows").len(), 1);

        // An offset past the end falls back to the first page.
        let response = server
            .get(&format!("/api/v1/licenses/{license_id}/seats?offset=50"))
            .await;
        let body: Value = response.json();
        assert_eq!(body["payload"]["rows"].as_array().expect("rows").len(), 3);

        let response = server
            .get(&format!(
                "/api/v1/licenses/{license_id}/seats?status=bogus"
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_seat_of_another_license_is_rejected() {
        let server = setup_server().await;

        let license_a = create_license(&server, "Suite A", 1, true).await;
        let license_b = create_license(&server, "Suite B", 1, true).await;
        let seats_a = seat_ids(&server, license_a).await;

        let response = server
            .get(&format!(
                "/api/v1/licenses/{license_b}/seats/{}",
                seats_a[0]
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(
            body["messages"],
            "Seat does not belong to the specified license"
        );
    }

    #[tokio::test]
    async fn test_seat_notes_only_update() {
        let server = setup_server().await;

        let license_id = create_license(&server, "Office Suite", 1, true).await;
        let seats = seat_ids(&server, license_id).await;

        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "notes": "kept in the drawer" }),
        )
        .await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["payload"]["notes"], "kept in the drawer");
        assert!(body["payload"]["assigned_to"].is_null());
        assert!(body["payload"]["asset_id"].is_null());
    }

    #[tokio::test]
    async fn test_seat_update_ignores_immutable_fields() {
        let server = setup_server().await;

        let license_id = create_license(&server, "Office Suite", 1, true).await;
        let seats = seat_ids(&server, license_id).await;

        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({
                "license_id": 9999,
                "unreassignable_seat": true,
                "created_by": 42,
                "notes": "note"
            }),
        )
        .await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["payload"]["license_id"], license_id);
        assert_eq!(body["payload"]["unreassignable_seat"], false);
        assert!(body["payload"]["created_by"].is_null());
        assert_eq!(body["payload"]["notes"], "note");
    }

    #[tokio::test]
    async fn test_seat_checkout_to_user() {
        let server = setup_server().await;

        let user_id = create_user(&server, "holder", None).await;
        let license_id = create_license(&server, "Office Suite", 1, true).await;
        let seats = seat_ids(&server, license_id).await;

        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": user_id }),
        )
        .await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["payload"]["assigned_to"], user_id);
        assert!(body["payload"]["asset_id"].is_null());

        // A checkout log against the user is appended.
        let response = server.get("/api/v1/reports/activity").await;
        let report: Value = response.json();
        let latest = &report["payload"][0];
        assert_eq!(latest["action_type"], "checkout");
        assert_eq!(latest["item_type"], "License");
        assert_eq!(latest["item_id"], license_id);
        assert_eq!(latest["target_type"], "User");
        assert_eq!(latest["target_id"], user_id);
    }

    #[tokio::test]
    async fn test_seat_checkout_to_asset() {
        let server = setup_server().await;

        let category_id = create_category(&server, "Laptops", false).await;
        let asset_id = create_asset(&server, "AST-1", category_id).await;
        let license_id = create_license(&server, "Office Suite", 1, true).await;
        let seats = seat_ids(&server, license_id).await;

        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "asset_id": asset_id }),
        )
        .await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["payload"]["asset_id"], asset_id);
        assert!(body["payload"]["assigned_to"].is_null());
    }

    #[tokio::test]
    async fn test_seat_swap_from_asset_to_user() {
        let server = setup_server().await;

        let user_id = create_user(&server, "holder", None).await;
        let category_id = create_category(&server, "Laptops", false).await;
        let asset_id = create_asset(&server, "AST-1", category_id).await;
        let license_id = create_license(&server, "Office Suite", 1, true).await;
        let seats = seat_ids(&server, license_id).await;

        patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "asset_id": asset_id }),
        )
        .await;

        // Clearing the asset while naming a user is a checkout, not a
        // checkin.
        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": user_id, "asset_id": null }),
        )
        .await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["payload"]["assigned_to"], user_id);
        assert!(body["payload"]["asset_id"].is_null());

        let response = server.get("/api/v1/reports/activity").await;
        let report: Value = response.json();
        let latest = &report["payload"][0];
        assert_eq!(latest["action_type"], "checkout");
        assert_eq!(latest["target_type"], "User");
        assert_eq!(latest["target_id"], user_id);
    }

    #[tokio::test]
    async fn test_seat_rejects_user_and_asset_together() {
        let server = setup_server().await;

        let user_id = create_user(&server, "holder", None).await;
        let category_id = create_category(&server, "Laptops", false).await;
        let asset_id = create_asset(&server, "AST-1", category_id).await;
        let license_id = create_license(&server, "Office Suite", 1, true).await;
        let seats = seat_ids(&server, license_id).await;

        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": user_id, "asset_id": asset_id }),
        )
        .await;
        assert_eq!(body["status"], "error");
        assert!(body["messages"]["assigned_to"][0].is_string());
        assert!(body["messages"]["asset_id"][0].is_string());

        // Nothing was written.
        let response = server
            .get(&format!(
                "/api/v1/licenses/{license_id}/seats/{}",
                seats[0]
            ))
            .await;
        let body: Value = response.json();
        assert!(body["payload"]["assigned_to"].is_null());
        assert!(body["payload"]["asset_id"].is_null());
    }

    #[tokio::test]
    async fn test_seat_rejects_unknown_user() {
        let server = setup_server().await;

        let license_id = create_license(&server, "Office Suite", 1, true).await;
        let seats = seat_ids(&server, license_id).await;

        let body = patch_seat(&server, license_id, seats[0], json!({ "assigned_to": 9999 })).await;
        assert_eq!(body["status"], "error");
        assert_eq!(
            body["messages"]["assigned_to"][0],
            "The selected assigned_to is invalid."
        );
    }

    #[tokio::test]
    async fn test_seat_rejects_soft_deleted_user() {
        let server = setup_server().await;

        let user_id = create_user(&server, "leaver", None).await;
        let response = server.delete(&format!("/api/v1/users/{user_id}")).await;
        response.assert_status(StatusCode::OK);

        let license_id = create_license(&server, "Office Suite", 1, true).await;
        let seats = seat_ids(&server, license_id).await;

        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": user_id }),
        )
        .await;
        assert_eq!(body["status"], "error");
        assert_eq!(
            body["messages"]["assigned_to"][0],
            "The selected assigned_to is invalid."
        );
    }

    #[tokio::test]
    async fn test_seat_rejects_wrong_json_types() {
        let server = setup_server().await;

        let license_id = create_license(&server, "Office Suite", 1, true).await;
        let seats = seat_ids(&server, license_id).await;

        // Wrong types come back as the standard envelope, not a 422.
        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": [1, 2], "notes": 7 }),
        )
        .await;
        assert_eq!(body["status"], "error");
        assert_eq!(
            body["messages"]["assigned_to"][0],
            "The assigned_to field must be an integer or null."
        );
        assert_eq!(
            body["messages"]["notes"][0],
            "The notes field must be a string or null."
        );
    }

    #[tokio::test]
    async fn test_checkin_burns_seat_of_non_reassignable_license() {
        let server = setup_server().await;

        let user_id = create_user(&server, "holder", None).await;
        let license_id = create_license(&server, "Locked Suite", 1, false).await;
        let seats = seat_ids(&server, license_id).await;

        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": user_id }),
        )
        .await;
        assert_eq!(body["status"], "success");

        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": null }),
        )
        .await;
        assert_eq!(body["status"], "success");
        assert!(body["payload"]["assigned_to"].is_null());
        assert_eq!(body["payload"]["unreassignable_seat"], true);

        // The seat can never be handed out again.
        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": user_id }),
        )
        .await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["messages"], "This seat is not available for checkout");
    }

    #[tokio::test]
    async fn test_checkin_of_soft_deleted_holder_still_logs() {
        let server = setup_server().await;

        let user_id = create_user(&server, "leaver", None).await;
        let license_id = create_license(&server, "Office Suite", 1, true).await;
        let seats = seat_ids(&server, license_id).await;

        patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": user_id }),
        )
        .await;

        let response = server.delete(&format!("/api/v1/users/{user_id}")).await;
        response.assert_status(StatusCode::OK);

        let body = patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": null }),
        )
        .await;
        assert_eq!(body["status"], "success");
        assert!(body["payload"]["assigned_to"].is_null());

        // The checkin log still names the departed holder.
        let response = server.get("/api/v1/reports/activity").await;
        let report: Value = response.json();
        let latest = &report["payload"][0];
        assert_eq!(latest["action_type"], "checkin");
        assert_eq!(latest["target_type"], "User");
        assert_eq!(latest["target_id"], user_id);
    }

    #[tokio::test]
    async fn test_license_utilization_counts() {
        let server = setup_server().await;

        let user_id = create_user(&server, "holder", None).await;
        let license_id = create_license(&server, "Office Suite", 3, true).await;
        let seats = seat_ids(&server, license_id).await;

        let response = server
            .get(&format!("/api/v1/licenses/{license_id}/utilization"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["payload"]["total"], 3);
        assert_eq!(body["payload"]["assigned"], 0);
        assert_eq!(body["payload"]["available"], 3);

        patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": user_id }),
        )
        .await;

        // The checkout invalidated the cached counts.
        let response = server
            .get(&format!("/api/v1/licenses/{license_id}/utilization"))
            .await;
        let body: Value = response.json();
        assert_eq!(body["payload"]["assigned"], 1);
        assert_eq!(body["payload"]["available"], 2);
    }

    #[tokio::test]
    async fn test_user_licenses_listing() {
        let server = setup_server().await;

        let user_id = create_user(&server, "holder", None).await;
        let license_id = create_license(&server, "Office Suite", 2, true).await;
        let seats = seat_ids(&server, license_id).await;

        patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": user_id }),
        )
        .await;

        let response = server
            .get(&format!("/api/v1/users/{user_id}/licenses"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let licenses = body["payload"].as_array().expect("licenses");
        assert_eq!(licenses.len(), 1);
        assert_eq!(licenses[0]["id"], license_id);
        assert_eq!(licenses[0]["name"], "Office Suite");
        assert_eq!(licenses[0]["seat_id"], seats[0]);
    }

    #[tokio::test]
    async fn test_license_delete_blocked_while_seats_assigned() {
        let server = setup_server().await;

        let user_id = create_user(&server, "holder", None).await;
        let license_id = create_license(&server, "Office Suite", 1, true).await;
        let seats = seat_ids(&server, license_id).await;

        patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": user_id }),
        )
        .await;

        let response = server.delete(&format!("/api/v1/licenses/{license_id}")).await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(
            body["messages"],
            "License cannot be deleted while seats are checked out"
        );

        patch_seat(
            &server,
            license_id,
            seats[0],
            json!({ "assigned_to": null }),
        )
        .await;

        let response = server.delete(&format!("/api/v1/licenses/{license_id}")).await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "success");

        let response = server.get(&format!("/api/v1/licenses/{license_id}")).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bulk_checkout_to_user() {
        let server = setup_server().await;

        let admin_id = create_user(&server, "admin", Some("admin@example.com")).await;
        let user_id = create_user(&server, "holder", Some("holder@example.com")).await;
        let category_id = create_category(&server, "Laptops", true).await;
        let asset_a = create_asset(&server, "AST-1", category_id).await;
        let asset_b = create_asset(&server, "AST-2", category_id).await;

        let response = server
            .post("/api/v1/assets/checkout")
            .json(&json!({
                "asset_ids": [asset_a, asset_b],
                "assigned_user": user_id,
                "checkout_by": admin_id,
                "note": "Onboarding kit"
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "success");
        let rows = body["payload"].as_array().expect("assets");
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert_eq!(row["assigned_to"], user_id);
        }

        // One checkout trail per asset, attributed to the admin.
        let response = server.get("/api/v1/reports/activity").await;
        let report: Value = response.json();
        let checkouts: Vec<&Value> = report["payload"]
            .as_array()
            .expect("activity")
            .iter()
            .filter(|e| e["action_type"] == "checkout")
            .collect();
        assert_eq!(checkouts.len(), 2);
        for entry in checkouts {
            assert_eq!(entry["item_type"], "Asset");
            assert_eq!(entry["target_type"], "User");
            assert_eq!(entry["target_id"], user_id);
            assert_eq!(entry["created_by"], admin_id);
            assert_eq!(entry["note"], "Onboarding kit");
        }
    }

    #[tokio::test]
    async fn test_bulk_checkout_validation_errors() {
        let server = setup_server().await;

        let admin_id = create_user(&server, "admin", None).await;
        let user_id = create_user(&server, "holder", None).await;
        let category_id = create_category(&server, "Laptops", false).await;
        let asset_id = create_asset(&server, "AST-1", category_id).await;

        // Check the asset out once so a second attempt conflicts.
        let response = server
            .post("/api/v1/assets/checkout")
            .json(&json!({
                "asset_ids": [asset_id],
                "assigned_user": user_id,
                "checkout_by": admin_id,
            }))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .post("/api/v1/assets/checkout")
            .json(&json!({
                "asset_ids": [asset_id, 9999],
                "assigned_user": user_id,
                "checkout_by": admin_id,
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        let messages = body["messages"]["asset_ids"]
            .as_array()
            .expect("asset id messages");
        assert_eq!(messages.len(), 2);

        // User and location at once is refused.
        let response = server
            .post("/api/v1/assets/checkout")
            .json(&json!({
                "asset_ids": [asset_id],
                "assigned_user": user_id,
                "assigned_location": 1,
                "checkout_by": admin_id,
            }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert!(body["messages"]["assigned_user"][0].is_string());
        assert!(body["messages"]["assigned_location"][0].is_string());

        // An empty batch is refused.
        let response = server
            .post("/api/v1/assets/checkout")
            .json(&json!({
                "asset_ids": [],
                "assigned_user": user_id,
                "checkout_by": admin_id,
            }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert!(body["messages"]["asset_ids"][0].is_string());

        // Repeated ids are refused, never checked out twice.
        let asset_free = create_asset(&server, "AST-2", category_id).await;
        let response = server
            .post("/api/v1/assets/checkout")
            .json(&json!({
                "asset_ids": [asset_free, asset_free],
                "assigned_user": user_id,
                "checkout_by": admin_id,
            }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert!(body["messages"]["asset_ids"][0]
            .as_str()
            .expect("duplicate message")
            .contains("more than once"));

        let response = server.get(&format!("/api/v1/assets/{asset_free}")).await;
        let body: Value = response.json();
        assert!(body["payload"]["assigned_to"].is_null());
    }

    #[tokio::test]
    async fn test_bulk_checkout_to_location() {
        let server = setup_server().await;

        let admin_id = create_user(&server, "admin", None).await;
        let category_id = create_category(&server, "Displays", false).await;
        let asset_id = create_asset(&server, "AST-1", category_id).await;

        let response = server
            .post("/api/v1/locations")
            .json(&json!({ "name": "Warehouse" }))
            .await;
        let body: Value = response.json();
        let location_id = body["payload"]["id"].as_i64().expect("location id");

        let response = server
            .post("/api/v1/assets/checkout")
            .json(&json!({
                "asset_ids": [asset_id],
                "assigned_location": location_id,
                "checkout_by": admin_id,
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "success");
        assert_eq!(body["payload"][0]["location_id"], location_id);
        assert!(body["payload"][0]["assigned_to"].is_null());

        let response = server.get("/api/v1/reports/activity").await;
        let report: Value = response.json();
        let latest = &report["payload"][0];
        assert_eq!(latest["action_type"], "checkout");
        assert_eq!(latest["target_type"], "Location");
        assert_eq!(latest["target_id"], location_id);
    }

    #[tokio::test]
    async fn test_asset_checkin() {
        let server = setup_server().await;

        let admin_id = create_user(&server, "admin", None).await;
        let user_id = create_user(&server, "holder", None).await;
        let category_id = create_category(&server, "Laptops", false).await;
        let asset_id = create_asset(&server, "AST-1", category_id).await;

        let response = server
            .post("/api/v1/assets/checkout")
            .json(&json!({
                "asset_ids": [asset_id],
                "assigned_user": user_id,
                "checkout_by": admin_id,
            }))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .post(&format!("/api/v1/assets/{asset_id}/checkin"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "success");
        assert!(body["payload"]["assigned_to"].is_null());

        let response = server.get("/api/v1/reports/activity").await;
        let report: Value = response.json();
        let latest = &report["payload"][0];
        assert_eq!(latest["action_type"], "checkin");
        assert_eq!(latest["item_type"], "Asset");
        assert_eq!(latest["target_id"], user_id);

        // A second checkin is a no-op rejection.
        let response = server
            .post(&format!("/api/v1/assets/{asset_id}/checkin"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["messages"], "Asset is not checked out");
    }

    #[tokio::test]
    async fn test_activity_report_order_and_pagination() {
        let server = setup_server().await;

        let category_id = create_category(&server, "Laptops", false).await;
        create_asset(&server, "AST-1", category_id).await;
        let asset_b = create_asset(&server, "AST-2", category_id).await;

        let response = server.get("/api/v1/reports/activity?limit=1").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let entries = body["payload"].as_array().expect("activity");
        assert_eq!(entries.len(), 1);
        // Newest first: the last created asset tops the report.
        assert_eq!(entries[0]["action_type"], "create");
        assert_eq!(entries[0]["item_id"], asset_b);

        let response = server.get("/api/v1/reports/activity?offset=1&limit=1").await;
        let body: Value = response.json();
        let entries = body["payload"].as_array().expect("activity");
        assert_eq!(entries.len(), 1);
        assert_ne!(entries[0]["item_id"], asset_b);
    }

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let server = setup_server().await;

        // First access creates the row with defaults.
        let response = server.get("/api/v1/settings").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["payload"]["site_name"], "assetrust");
        assert!(body["payload"]["admin_cc_email"].is_null());

        let response = server
            .put("/api/v1/settings")
            .json(&json!({
                "site_name": "Example IT",
                "admin_cc_email": "it@example.com",
                "admin_cc_always": true,
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "success");

        let response = server.get("/api/v1/settings").await;
        let body: Value = response.json();
        assert_eq!(body["payload"]["site_name"], "Example IT");
        assert_eq!(body["payload"]["admin_cc_email"], "it@example.com");
        assert_eq!(body["payload"]["admin_cc_always"], true);
    }

    #[tokio::test]
    async fn test_settings_rejects_invalid_email() {
        let server = setup_server().await;

        let response = server
            .put("/api/v1/settings")
            .json(&json!({ "admin_cc_email": "nope" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert!(body["messages"]["admin_cc_email"][0].is_string());
    }

    #[tokio::test]
    async fn test_maintenance_crud() {
        let server = setup_server().await;

        let category_id = create_category(&server, "Laptops", false).await;
        let asset_id = create_asset(&server, "AST-1", category_id).await;

        let response = server
            .post("/api/v1/maintenances")
            .json(&json!({
                "asset_id": asset_id,
                "maintenance_type": "repair",
                "name": "Screen swap",
                "start_date": "2024-03-01",
                "is_warranty": true,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let maintenance_id = body["payload"]["id"].as_i64().expect("maintenance id");
        assert_eq!(body["payload"]["maintenance_type"], "repair");

        let response = server
            .put(&format!("/api/v1/maintenances/{maintenance_id}"))
            .json(&json!({ "completion_date": "2024-03-05" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["payload"]["completion_date"], "2024-03-05");

        // Unknown types come back as a field error.
        let response = server
            .post("/api/v1/maintenances")
            .json(&json!({
                "asset_id": asset_id,
                "maintenance_type": "polish",
                "name": "Nope",
                "start_date": "2024-03-01",
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert!(body["messages"]["maintenance_type"][0].is_string());
    }
}
