use hospital_mystery::data::ClueKind;
use hospital_mystery::game::{
    AnswerOutcome, AudioCue, BasementClue, CodeEntry, DoorOutcome, DosageOutcome, ElevatorRide,
    Ending, EngineEvent, Floor2Door, FloorEntry, FloorOrigin, Game, GamePhase, PuzzleId, RoomPick,
    SceneChange, SceneId, SearchArea, SearchOutcome, SequenceId, SequencePhase, WiringOutcome,
    TOTAL_PUZZLES, WRONG_ANSWER_RISK,
};
use hospital_mystery::save::{self, FileStore, MemoryStore, SaveSlot};
use rand::RngCore;

/// Deterministic roll source for scripted nights.
struct FixedRng(u64);

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        self.0 as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = 0;
        }
    }
}

fn calm_rolls() -> FixedRng {
    FixedRng(u64::MAX)
}

fn doomed_rolls() -> FixedRng {
    FixedRng(0)
}

/// Run whatever sequence is playing to its end.
fn settle(game: &mut Game) {
    for _ in 0..64 {
        game.tick(true);
    }
}

#[test]
fn the_clean_route_reaches_the_truth() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = FileStore::new(dir.path());
    let mut rng = calm_rolls();
    let mut game = Game::new();

    assert_eq!(game.current_scene, SceneId::Lobby);
    game.view_floor_map();
    assert!(game.journal.has(ClueKind::FloorMapNote));

    // A wrong reading of the map costs risk and nothing else.
    assert_eq!(
        game.submit_answer(PuzzleId::FloorSelection, "6", &mut rng, &mut store),
        AnswerOutcome::Rejected { escalated: false }
    );
    assert_eq!(game.detection_risk, WRONG_ANSWER_RISK);
    assert!(game.is_playing());

    assert_eq!(
        game.submit_answer(PuzzleId::FloorSelection, "  7  ", &mut rng, &mut store),
        AnswerOutcome::Accepted
    );
    assert_eq!(
        game.enter_floor(FloorOrigin::LobbyMap, 7, &mut store),
        FloorEntry::RoomPicker
    );
    assert_eq!(
        game.pick_seventh_floor_room(717),
        RoomPick::Opened(SceneId::Ward717)
    );

    game.read_ward_note();
    game.flip_ward_note();
    assert!(game.journal.has(ClueKind::NurseCipherNote));
    assert!(game.journal.has(ClueKind::CipherKeyBack));

    // The window shows nothing until the note reads right.
    assert!(!game.check_ward_window());
    assert_eq!(
        game.submit_answer(PuzzleId::NurseCipher, "SHOUSHUSHI", &mut rng, &mut store),
        AnswerOutcome::Accepted
    );
    assert!(game.check_ward_window());
    assert!(game.journal.has(ClueKind::WindowFigure));
    assert_eq!(
        game.submit_answer(PuzzleId::MonitorCipher, "hidden", &mut rng, &mut store),
        AnswerOutcome::Accepted
    );

    // Down the fire exit to the operating room, and wait the nurse out.
    assert_eq!(
        game.enter_floor(FloorOrigin::FireExit, 6, &mut store),
        FloorEntry::Entered(SceneId::OperatingRoom)
    );
    assert_eq!(
        game.sequence_phase(SequenceId::NurseDeparture),
        SequencePhase::Active
    );
    assert_eq!(
        game.search_operating_area(SearchArea::UnderOperatingTable),
        SearchOutcome::NotReady
    );
    settle(&mut game);
    assert_eq!(
        game.sequence_phase(SequenceId::NurseDeparture),
        SequencePhase::Completed
    );

    assert_eq!(
        game.search_operating_area(SearchArea::UnderOperatingTable),
        SearchOutcome::Found
    );
    assert_eq!(
        game.search_operating_area(SearchArea::InstrumentTray),
        SearchOutcome::Found
    );
    assert_eq!(
        game.search_operating_area(SearchArea::CornerTrashBin),
        SearchOutcome::RecordAssembled { clean: true }
    );
    assert!(game.journal.has(ClueKind::CleanNursingRecord));
    assert!(game.view_nursing_record());

    // The intact record names the second floor, behind the patrol.
    assert_eq!(
        game.enter_floor(FloorOrigin::FireExit, 2, &mut store),
        FloorEntry::PatrolStarted
    );
    settle(&mut game);
    assert_eq!(game.current_scene, SceneId::Floor2Landing);

    assert_eq!(
        game.choose_floor2_door(Floor2Door::ElectricianDoor, &mut store),
        DoorOutcome::Opened(SceneId::ElectricianRoom)
    );
    assert!(game.take_key_203());
    assert!(game.open_breaker_box());
    assert_eq!(
        game.submit_breaker_wiring(&[(0, 1), (1, 0), (2, 2)], &mut store),
        WiringOutcome::Correct
    );
    assert!(game.has_elevator_card);
    assert!(game.journal.has(ClueKind::ElevatorCard));

    // Keep a slot here; the night is long.
    save::save_slot(&game, &mut store, SaveSlot::Two).expect("slot two saves");

    // With the key in hand, 717's door now means 203.
    assert_eq!(
        game.change_scene(SceneId::Ward717),
        SceneChange::Moved(SceneId::Ward203)
    );
    assert!(game.examine_dosage_chart());
    assert_eq!(
        game.mix_medicine("15", &mut store),
        DosageOutcome::PatientCalmed
    );
    settle(&mut game);
    assert!(game.patient_awake);
    assert!(game.advance_dialogue().is_some());
    assert!(game.advance_dialogue().is_some());
    assert!(game.advance_dialogue().is_some());
    assert!(game.advance_dialogue().is_none());
    assert!(game.journal.has(ClueKind::PatientTestimony));

    assert_eq!(
        game.change_scene(SceneId::MonitorRoom),
        SceneChange::Moved(SceneId::MonitorRoom)
    );
    game.watch_monitor_screen();
    assert!(game.journal.has(ClueKind::GestureCode));

    assert_eq!(
        game.change_scene(SceneId::DirectorOffice),
        SceneChange::Moved(SceneId::DirectorOffice)
    );
    assert!(!game.examine_safe_contents());
    assert_eq!(
        game.submit_answer(PuzzleId::SafeWiring, "2-1-4-3-5", &mut rng, &mut store),
        AnswerOutcome::Accepted
    );
    assert!(game.examine_safe_contents());
    assert!(game.journal.has(ClueKind::SafePhoto));
    assert!(game.journal.has(ClueKind::VoiceRecorder));

    // 02:13 from the footage, 12/25 from the photo.
    assert_eq!(
        game.submit_answer(PuzzleId::ElevatorCode, "02131225", &mut rng, &mut store),
        AnswerOutcome::Accepted
    );

    assert_eq!(
        game.change_scene(SceneId::MonitorRoom),
        SceneChange::Moved(SceneId::MonitorRoom)
    );
    assert_eq!(game.ride_monitor_elevator(&mut store), ElevatorRide::Descended);
    assert_eq!(game.current_scene, SceneId::UndergroundElevator);

    game.drain_events();
    assert_eq!(
        game.enter_underground_code("0010000001111101", &mut store),
        CodeEntry::Opened
    );
    let events = game.drain_events();
    assert!(events.contains(&EngineEvent::Audio(AudioCue::PlayBgm("bgm4".into()))));

    assert_eq!(
        game.change_scene(SceneId::Basement),
        SceneChange::Moved(SceneId::Basement)
    );
    assert!(game.collect_basement_clue(BasementClue::ProjectCode));
    assert!(game.collect_basement_clue(BasementClue::PatientName));
    assert!(game.collect_basement_clue(BasementClue::DateStamp));
    assert!(!game.unlock_basement_computer("password"));
    assert!(game.is_playing());
    assert!(game.unlock_basement_computer("20230824x-17chenjuzi"));
    assert!(game.journal.has(ClueKind::ExperimentData));

    assert_eq!(game.counted_solved(), TOTAL_PUZZLES);
    assert!(game.final_truth_available());
    assert_eq!(
        game.submit_answer(
            PuzzleId::FinalTruth,
            " Shoushushi-Hidden-02131225 ",
            &mut rng,
            &mut store,
        ),
        AnswerOutcome::TruthConfirmed
    );
    assert_eq!(game.phase, GamePhase::GameOver(Ending::TruthRevealed));
    assert!(game
        .drain_events()
        .contains(&EngineEvent::EndingReached(Ending::TruthRevealed)));

    // Winning leaves no failure checkpoint, and the manual slot still loads.
    assert!(!save::has_checkpoint(&store));
    let kept = save::load_slot(&store, SaveSlot::Two).expect("slot two loads");
    assert!(kept.is_playing());
    assert_eq!(kept.current_scene, SceneId::ElectricianRoom);
    assert!(kept.has_elevator_card);
}

#[test]
fn the_tampered_record_route_fails_and_resumes() {
    let mut store = MemoryStore::new();
    let mut rng = calm_rolls();
    let mut game = Game::new();

    assert_eq!(
        game.submit_answer(PuzzleId::FloorSelection, "7", &mut rng, &mut store),
        AnswerOutcome::Accepted
    );
    assert_eq!(
        game.enter_floor(FloorOrigin::LobbyMap, 7, &mut store),
        FloorEntry::RoomPicker
    );
    assert_eq!(
        game.pick_seventh_floor_room(717),
        RoomPick::Opened(SceneId::Ward717)
    );
    assert_eq!(
        game.enter_floor(FloorOrigin::FireExit, 6, &mut store),
        FloorEntry::Entered(SceneId::OperatingRoom)
    );
    settle(&mut game);

    // One bait page taints the whole record.
    assert_eq!(
        game.search_operating_area(SearchArea::InstrumentTray),
        SearchOutcome::Found
    );
    assert_eq!(
        game.search_operating_area(SearchArea::SupplyCabinet),
        SearchOutcome::Found
    );
    assert_eq!(
        game.search_operating_area(SearchArea::CornerTrashBin),
        SearchOutcome::RecordAssembled { clean: false }
    );
    assert!(game.journal.has(ClueKind::MisleadingNursingRecord));
    assert!(game.view_nursing_record());

    // The tainted record sells the fourth floor, and 401 is the pitch.
    assert_eq!(
        game.enter_floor(FloorOrigin::FireExit, 4, &mut store),
        FloorEntry::Room401Picker
    );
    assert_eq!(game.pick_fourth_floor_room(403, &mut store), RoomPick::Dark);
    assert!(game.is_playing());
    assert_eq!(
        game.pick_fourth_floor_room(401, &mut store),
        RoomPick::FatalEnding
    );
    assert_eq!(game.phase, GamePhase::GameOver(Ending::WrongTurn));
    assert!(game
        .drain_events()
        .contains(&EngineEvent::EndingReached(Ending::WrongTurn)));

    // A finished night ignores further prodding.
    assert_eq!(game.change_scene(SceneId::Lobby), SceneChange::Ignored);

    // The failure left one checkpoint, good for exactly one resume.
    assert!(save::has_checkpoint(&store));
    let mut resumed = save::take_checkpoint(&mut store).expect("checkpoint resumes");
    assert!(save::take_checkpoint(&mut store).is_none());
    assert!(resumed.is_playing());
    assert_eq!(resumed.current_scene, SceneId::OperatingRoom);
    assert!(resumed.journal.has(ClueKind::MisleadingNursingRecord));
    assert!(resumed.solved.contains(&PuzzleId::FloorSelection));

    // The rewound room starts its search over, nurse already gone.
    assert_eq!(resumed.search.total(), 0);
    assert!(!resumed.search.record_found);
    assert_eq!(
        resumed.sequence_phase(SequenceId::NurseDeparture),
        SequencePhase::Completed
    );

    // The second read of the room can still be the right one.
    assert_eq!(
        resumed.search_operating_area(SearchArea::UnderOperatingTable),
        SearchOutcome::Found
    );
    assert_eq!(
        resumed.search_operating_area(SearchArea::InstrumentTray),
        SearchOutcome::Found
    );
    assert_eq!(
        resumed.search_operating_area(SearchArea::CornerTrashBin),
        SearchOutcome::RecordAssembled { clean: true }
    );
    assert_eq!(
        resumed.enter_floor(FloorOrigin::FireExit, 2, &mut store),
        FloorEntry::PatrolStarted
    );
    settle(&mut resumed);
    assert_eq!(resumed.current_scene, SceneId::Floor2Landing);
}

#[test]
fn escalation_leaves_a_checkpoint_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = FileStore::new(dir.path());
    let mut game = Game::new();

    // Three points a miss: 26 misses crest at 78, still short of the line.
    let mut rng = calm_rolls();
    for _ in 0..26 {
        assert_eq!(
            game.submit_answer(PuzzleId::SafeWiring, "1-2-3-4-5", &mut rng, &mut store),
            AnswerOutcome::Rejected { escalated: false }
        );
    }
    assert_eq!(game.detection_risk, 78);
    assert!(game.is_playing());

    // The next miss crosses it, and tonight the roll is unkind.
    let mut rng = doomed_rolls();
    assert_eq!(
        game.submit_answer(PuzzleId::SafeWiring, "1-2-3-4-5", &mut rng, &mut store),
        AnswerOutcome::Rejected { escalated: true }
    );
    assert_eq!(game.phase, GamePhase::GameOver(Ending::Seized));
    assert!(game
        .drain_events()
        .contains(&EngineEvent::EndingReached(Ending::Seized)));

    let key_file = dir.path().join(format!("{}.json", save::CHECKPOINT_KEY));
    assert!(key_file.exists());
    assert!(save::has_checkpoint(&store));

    let resumed = save::take_checkpoint(&mut store).expect("checkpoint resumes");
    assert!(!key_file.exists());
    assert!(resumed.is_playing());

    // Seized failures keep their scene, and the heat stays on.
    assert_eq!(resumed.current_scene, SceneId::Lobby);
    assert_eq!(resumed.detection_risk, 81);
}
