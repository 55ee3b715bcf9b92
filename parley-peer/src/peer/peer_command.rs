use crate::channel::ChatRoute;
use crate::error::Result;
use crate::media::LocalMedia;
use crate::session::ConnectionStats;
use parley_core::{ChatPayload, RoomId};
use tokio::sync::oneshot;

/// Команды, поступающие в цикл пира от контроллера (CLI/UI).
#[derive(Debug)]
pub enum PeerCommand {
    /// Новая сессия в комнате, без опроса почтового ящика.
    CreateSession {
        room: RoomId,
        reply: oneshot::Sender<Result<()>>,
    },

    /// Стать инициатором: приложить медиа и отправить offer.
    StartAsInitiator {
        media: Option<LocalMedia>,
        reply: oneshot::Sender<Result<()>>,
    },

    /// Создать сессию и сразу обработать то, что уже лежит в ящике (offer инициатора).
    Join {
        room: RoomId,
        reply: oneshot::Sender<Result<()>>,
    },

    SendChat {
        payload: ChatPayload,
        reply: oneshot::Sender<Result<ChatRoute>>,
    },

    Stats {
        reply: oneshot::Sender<Option<ConnectionStats>>,
    },

    /// Закрыть сессию и очистить ящик комнаты.
    Close { reply: oneshot::Sender<Result<()>> },
}
