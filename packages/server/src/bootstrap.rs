//! Dependency wiring shared by the server binary and the integration tests.

use std::{collections::HashMap, sync::Arc};

use rickshaw_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    infrastructure::{
        fare::CampusFareTable,
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryNotificationRepository, InMemoryParticipantRepository,
            InMemoryRideRequestRepository, InMemoryUserDirectory,
        },
    },
    ui::{AppState, Server, TimeoutSupervisor},
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, DriverAvailabilityUseCase,
        MatchingConfig, MatchingCoordinator, NotificationDispatcher, ProfileUseCase,
    },
};

/// 全ての依存関係を組み立てて Server を作る
pub fn build_server(config: MatchingConfig, clock: Arc<dyn Clock>) -> Server {
    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. FareEstimator
    // 4. UseCases
    // 5. AppState
    // 6. Server

    // 1. Create Repository (in-memory database)
    let participants = Arc::new(InMemoryParticipantRepository::new());
    let rides = Arc::new(InMemoryRideRequestRepository::new());
    let notifications = Arc::new(InMemoryNotificationRepository::new());
    let directory = Arc::new(InMemoryUserDirectory::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_clients));

    // 3. Create FareEstimator (campus route table)
    let fares = Arc::new(CampusFareTable::default());

    // 4. Create UseCases
    let dispatcher = Arc::new(NotificationDispatcher::new(
        message_pusher.clone(),
        notifications.clone(),
        clock.clone(),
    ));
    let coordinator = Arc::new(MatchingCoordinator::new(
        rides.clone(),
        participants.clone(),
        dispatcher.clone(),
        fares,
        clock.clone(),
        config,
    ));
    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
        participants.clone(),
        message_pusher.clone(),
        dispatcher.clone(),
        directory.clone(),
        clock,
    ));
    let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
        participants.clone(),
        message_pusher,
        coordinator.clone(),
        directory.clone(),
    ));
    let availability_usecase = Arc::new(DriverAvailabilityUseCase::new(
        participants.clone(),
        rides,
        directory.clone(),
        dispatcher.clone(),
    ));
    let profile_usecase = Arc::new(ProfileUseCase::new(directory));

    // 5. Create AppState
    let supervisor = TimeoutSupervisor::new(coordinator.clone(), dispatcher.clone(), config);
    let state = AppState {
        connect_participant_usecase,
        disconnect_participant_usecase,
        coordinator,
        availability_usecase,
        profile_usecase,
        dispatcher,
        participants,
    };

    // 6. Create Server
    Server::new(state, supervisor)
}
