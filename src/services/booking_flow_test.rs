#[cfg(test)]
mod booking_flow_tests {
    use crate::error::BookingError;
    use crate::models::appointment::{BlockReason, Verdict};
    use crate::services::booking_flow::{BookingPhase, BookingViewState};
    use crate::tests::common::fixtures::{
        active_appointment, at, clinic, config, date, doctor, slot,
    };

    // Monday morning, clinic and doctor chosen, looking at Tuesday
    fn ready_state() -> BookingViewState {
        let config = config();
        let today = date("2035-03-05");
        let mut state = BookingViewState::new(today, &config);
        state.set_patient(42);
        state.set_clinics(vec![clinic(1, "Dermatology", true)]);
        state.select_clinic(Some(clinic(1, "Dermatology", true))).unwrap();
        assert!(state.set_doctors(1, vec![doctor(7, "Ayse", "Yilmaz")]));
        state
            .select_date(date("2035-03-06"), today, &config)
            .unwrap();
        state.select_doctor(Some(7)).unwrap();
        state
    }

    #[test]
    fn test_inactive_clinics_are_hidden() {
        let mut state = BookingViewState::new(date("2035-03-05"), &config());
        state.set_clinics(vec![clinic(1, "Open", true), clinic(2, "Closed", false)]);
        assert_eq!(state.clinics.len(), 1);
        assert_eq!(state.clinics[0].name, "Open");
    }

    #[test]
    fn test_clinic_change_clears_dependent_selection() {
        let mut state = ready_state();
        state
            .choose_slot(slot("09:00"), at("2035-03-05", "08:00"))
            .unwrap();

        state.select_clinic(Some(clinic(2, "Cardiology", true))).unwrap();
        assert!(state.selected_doctor_id.is_none());
        assert!(state.selected_time.is_none());
        assert!(state.doctors.is_empty());
        assert_eq!(state.phase, BookingPhase::Idle);

        // Doctor list for the previous clinic arrives late
        assert!(!state.set_doctors(1, vec![doctor(7, "Ayse", "Yilmaz")]));
    }

    #[test]
    fn test_past_dates_are_refused() {
        let mut state = BookingViewState::new(date("2035-03-05"), &config());
        let result = state.select_date(date("2035-03-04"), date("2035-03-05"), &config());
        assert!(matches!(result, Err(BookingError::PastDate(_))));
    }

    #[test]
    fn test_disabled_slot_cannot_be_chosen() {
        let mut state = ready_state();
        let key = state.selection_key().unwrap();
        state.accept_doctor_appointments(
            key,
            vec![active_appointment(1, key.date, "09:20:00", 1, "Dermatology")],
        );

        let now = at("2035-03-05", "08:00");
        assert!(state.is_slot_disabled(&slot("09:20"), now));
        assert!(matches!(
            state.choose_slot(slot("09:20"), now),
            Err(BookingError::SlotUnavailable { .. })
        ));
        // Lunch hour is not on the grid
        assert!(state.choose_slot(slot("12:00"), now).is_err());
        assert_eq!(state.phase, BookingPhase::Idle);
    }

    #[test]
    fn test_proceed_moves_to_submitting() {
        let mut state = ready_state();
        state
            .choose_slot(slot("10:20"), at("2035-03-05", "08:00"))
            .unwrap();
        assert_eq!(state.phase, BookingPhase::SlotChosen);

        assert_eq!(state.evaluate_selection().unwrap(), Verdict::Proceed);
        assert_eq!(state.phase, BookingPhase::Submitting);

        let request = state.booking_request();
        assert_eq!(request.time, "10:20");
        assert_eq!(request.clinic.id, Some(1));
        assert_eq!(request.doctor_id, Some(7));
    }

    #[test]
    fn test_missing_slot_is_blocked() {
        let mut state = ready_state();
        let verdict = state.evaluate_selection().unwrap();
        assert_eq!(
            verdict,
            Verdict::Block {
                reason: BlockReason::IncompleteSelection
            }
        );
        assert_eq!(
            state.phase,
            BookingPhase::Blocked {
                reason: BlockReason::IncompleteSelection
            }
        );
    }

    #[test]
    fn test_confirmation_can_be_cancelled() {
        let mut state = ready_state();
        state.accept_patient_appointments(
            42,
            vec![active_appointment(
                11,
                date("2035-03-01"),
                "10:00",
                1,
                "Dermatology",
            )],
        );
        state
            .choose_slot(slot("10:20"), at("2035-03-05", "08:00"))
            .unwrap();

        state.evaluate_selection().unwrap();
        assert_eq!(
            state.phase,
            BookingPhase::AwaitingConfirmation { existing_id: 11 }
        );

        // Nothing else may happen while the dialog is up
        assert!(matches!(
            state.select_doctor(Some(8)),
            Err(BookingError::InvalidTransition { .. })
        ));

        state.cancel().unwrap();
        assert_eq!(state.phase, BookingPhase::Idle);
        assert!(state.selected_time.is_none());
    }

    #[test]
    fn test_failed_submission_can_retry() {
        let mut state = ready_state();
        state
            .choose_slot(slot("10:20"), at("2035-03-05", "08:00"))
            .unwrap();
        state.evaluate_selection().unwrap();

        state.submission_failed("Could not create appointment").unwrap();
        assert!(matches!(state.phase, BookingPhase::Failed { .. }));
        assert!(state.confirm_replace().is_err());

        state.retry().unwrap();
        assert_eq!(state.phase, BookingPhase::SlotChosen);
        assert_eq!(state.selected_time, Some(slot("10:20")));

        state.evaluate_selection().unwrap();
        state.submission_succeeded().unwrap();
        assert_eq!(state.phase, BookingPhase::Submitted);
        assert!(state.selected_time.is_none());
        assert!(state.grid.is_empty());
    }

    #[test]
    fn test_weekend_cannot_be_evaluated() {
        let config = config();
        let today = date("2035-03-02");
        let mut state = BookingViewState::new(today, &config);
        state.select_date(date("2035-03-03"), today, &config).unwrap();

        assert!(state.grid.is_empty());
        assert!(matches!(
            state.evaluate_selection(),
            Err(BookingError::WeekendDate(_))
        ));
        assert_eq!(state.phase, BookingPhase::Idle);
    }

    #[test]
    fn test_view_state_round_trips_through_json() {
        let mut state = ready_state();
        state
            .choose_slot(slot("10:20"), at("2035-03-05", "08:00"))
            .unwrap();

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["phase"]["phase"], "slot_chosen");
        assert_eq!(json["selected_time"], "10:20");

        let restored: BookingViewState = serde_json::from_value(json).unwrap();
        assert_eq!(restored.selected_time, state.selected_time);
        assert_eq!(restored.phase, state.phase);
    }
}
