#[cfg(test)]
mod booking_tests {
    use mockall::predicate::eq;

    use crate::client_mock::MockBackend;
    use crate::error::{BookingError, RemoteError};
    use crate::models::appointment::Verdict;
    use crate::services::booking::{evaluate_booking, load_slot_grid, resolve_clinic, submit_booking};
    use crate::tests::common::fixtures::{
        active_appointment, at, clinic, config, date, request,
    };

    fn backend_with(
        patient: Vec<crate::models::appointment::Appointment>,
        doctor: Vec<crate::models::appointment::Appointment>,
    ) -> MockBackend {
        let mut backend = MockBackend::new();
        backend
            .expect_appointments_by_patient()
            .with(eq(42))
            .returning(move |_| Ok(patient.clone()));
        backend
            .expect_appointments_by_doctor()
            .returning(move |_, _| Ok(doctor.clone()));
        backend
    }

    #[tokio::test]
    async fn test_slot_grid_marks_doctor_bookings() {
        let d = date("2035-03-06");
        let backend = backend_with(
            Vec::new(),
            vec![active_appointment(1, d, "13:40:00", 1, "Dermatology")],
        );

        let grid = load_slot_grid(&backend, 7, d, at("2035-03-05", "12:00"), &config())
            .await
            .unwrap();

        assert!(!grid.weekend);
        assert_eq!(grid.groups.len(), 8);
        let taken: Vec<String> = grid
            .groups
            .iter()
            .flat_map(|g| g.slots.iter())
            .filter(|s| s.disabled)
            .map(|s| s.time.to_string())
            .collect();
        assert_eq!(taken, vec!["13:40"]);
    }

    #[tokio::test]
    async fn test_weekend_grid_skips_remote_call() {
        let backend = MockBackend::new();
        let grid = load_slot_grid(
            &backend,
            7,
            date("2035-03-03"),
            at("2035-03-02", "12:00"),
            &config(),
        )
        .await
        .unwrap();

        assert!(grid.weekend);
        assert!(grid.groups.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_clinic_ignores_inactive() {
        let mut backend = MockBackend::new();
        backend
            .expect_list_clinics()
            .returning(|| Ok(vec![clinic(1, "Open", true), clinic(2, "Closed", false)]));

        assert_eq!(resolve_clinic(&backend, 1).await.unwrap().name, "Open");
        assert!(matches!(
            resolve_clinic(&backend, 2).await,
            Err(BookingError::UnknownClinic(2))
        ));
    }

    #[tokio::test]
    async fn test_evaluate_without_patient_does_not_call_remote() {
        let backend = MockBackend::new();
        let mut req = request(1, "Dermatology", date("2035-03-06"), "10:00");
        req.patient_id = None;

        let verdict = evaluate_booking(&backend, &req).await.unwrap();
        assert!(matches!(verdict, Verdict::Block { .. }));
    }

    #[tokio::test]
    async fn test_submit_proceeds_and_sends_request() {
        let mut backend = backend_with(Vec::new(), Vec::new());
        backend
            .expect_create_appointment()
            .withf(|req| req.time == "10:20" && req.doctor_id == Some(7))
            .times(1)
            .returning(|_| Ok(()));

        let req = request(1, "Dermatology", date("2035-03-06"), "10:20");
        let outcome = submit_booking(&backend, &req, false, at("2035-03-05", "09:00"), &config())
            .await
            .unwrap();
        assert_eq!(outcome.superseded_id, None);
    }

    #[tokio::test]
    async fn test_submit_requires_confirmation_for_same_clinic() {
        let history = vec![active_appointment(
            11,
            date("2035-03-01"),
            "10:00",
            1,
            "Dermatology",
        )];
        let mut backend = backend_with(history, Vec::new());
        backend.expect_create_appointment().times(1).returning(|_| Ok(()));

        let req = request(1, "Dermatology", date("2035-03-06"), "10:20");
        let now = at("2035-03-05", "09:00");

        let unconfirmed = submit_booking(&backend, &req, false, now, &config()).await;
        assert!(matches!(
            unconfirmed,
            Err(BookingError::RequiresConfirmation { existing_id: 11 })
        ));

        let confirmed = submit_booking(&backend, &req, true, now, &config())
            .await
            .unwrap();
        assert_eq!(confirmed.superseded_id, Some(11));
    }

    #[tokio::test]
    async fn test_submit_rejects_duplicate_slot() {
        let d = date("2035-03-06");
        let history = vec![active_appointment(3, d, "10:20:00", 9, "Cardiology")];
        let mut backend = backend_with(history, Vec::new());
        backend.expect_create_appointment().never();

        let req = request(1, "Dermatology", d, "10:20");
        let result = submit_booking(&backend, &req, true, at("2035-03-05", "09:00"), &config()).await;
        assert!(matches!(result, Err(BookingError::DuplicateActiveSlot)));
    }

    #[tokio::test]
    async fn test_submit_rejects_taken_or_off_grid_slot() {
        let d = date("2035-03-06");
        let mut backend = backend_with(
            Vec::new(),
            vec![active_appointment(8, d, "10:20:00", 1, "Dermatology")],
        );
        backend.expect_create_appointment().never();
        let now = at("2035-03-05", "09:00");

        for time in ["10:20", "12:00", "10:25", "ten"] {
            let req = request(1, "Dermatology", d, time);
            let result = submit_booking(&backend, &req, false, now, &config()).await;
            assert!(
                matches!(result, Err(BookingError::SlotUnavailable { .. })),
                "{} should be unavailable",
                time
            );
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_past_slot_today() {
        let mut backend = backend_with(Vec::new(), Vec::new());
        backend.expect_create_appointment().never();

        let req = request(1, "Dermatology", date("2035-03-05"), "09:40");
        let result = submit_booking(&backend, &req, false, at("2035-03-05", "10:05"), &config()).await;
        assert!(matches!(result, Err(BookingError::SlotUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_earlier_day_is_refused() {
        let mut backend = MockBackend::new();
        backend.expect_appointments_by_patient().never();
        backend.expect_appointments_by_doctor().never();
        backend.expect_create_appointment().never();
        let now = at("2035-03-05", "10:05");

        // Friday before "today", with a completely free grid
        let req = request(1, "Dermatology", date("2035-03-02"), "09:00");
        assert!(matches!(
            submit_booking(&backend, &req, false, now, &config()).await,
            Err(BookingError::PastDate(_))
        ));

        let grid = load_slot_grid(&backend, 7, date("2035-03-02"), now, &config()).await;
        assert!(matches!(grid, Err(BookingError::PastDate(_))));
    }

    #[tokio::test]
    async fn test_submit_rejects_weekend_and_incomplete() {
        let backend = MockBackend::new();
        let now = at("2035-03-02", "09:00");

        let weekend = request(1, "Dermatology", date("2035-03-03"), "10:20");
        assert!(matches!(
            submit_booking(&backend, &weekend, false, now, &config()).await,
            Err(BookingError::WeekendDate(_))
        ));

        let mut incomplete = request(1, "Dermatology", date("2035-03-06"), "10:20");
        incomplete.doctor_id = None;
        assert!(matches!(
            submit_booking(&backend, &incomplete, false, now, &config()).await,
            Err(BookingError::IncompleteSelection)
        ));
    }

    #[tokio::test]
    async fn test_remote_failure_is_not_retried() {
        let mut backend = backend_with(Vec::new(), Vec::new());
        backend.expect_create_appointment().times(1).returning(|_| {
            Err(RemoteError::Status {
                status: 503,
                path: "/appointments".to_string(),
            })
        });

        let req = request(1, "Dermatology", date("2035-03-06"), "10:20");
        let result = submit_booking(&backend, &req, false, at("2035-03-05", "09:00"), &config()).await;
        assert!(matches!(result, Err(BookingError::Remote(_))));
    }
}
