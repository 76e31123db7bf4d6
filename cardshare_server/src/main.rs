use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use clap::Parser;
use dashmap::{mapref::entry::Entry, DashMap};
use futures_util::{stream::StreamExt, SinkExt};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cardshare_core::{CardAction, CardShareError, ClientMessage, GameKey, GameStore, Lobby, PlayerView, ServerMessage};

/// 服务器配置，命令行参数优先，其次是环境变量
#[derive(Parser, Debug)]
#[command(name = "cardshare_server", about = "共享卡牌服务器")]
struct ServerConfig {
    /// 监听地址
    #[arg(long, env = "CARDSHARE_HOST", default_value = "0.0.0.0")]
    host: IpAddr,
    /// 监听端口
    #[arg(long, env = "CARDSHARE_PORT", default_value_t = 25917)]
    port: u16,
}

// 服务器全局状态
// 游戏数据由 Lobby 管理（每局游戏一把锁），这里只保存网络连接
struct AppState {
    lobby: Lobby,
    // 游戏ID -> (玩家名 -> 该玩家连接的发送通道)
    connections: DashMap<GameKey, HashMap<String, mpsc::Sender<ServerMessage>>>,
}

type SharedState = Arc<AppState>;

// 当前连接所在的游戏和玩家名，在创建或加入游戏后填充
type SessionContext = Option<(GameKey, String)>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();

    let state = SharedState::new(AppState {
        lobby: Lobby::new(),
        connections: DashMap::new(),
    });
    info!("可用的游戏类型: {:?}", state.lobby.game_types());

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(state);

    let addr = SocketAddr::new(config.host, config.port);
    info!("服务器正在监听 {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

/// 处理 WebSocket 连接请求
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// 处理单个 WebSocket 连接的生命周期
async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();

    // 创建一个 MPSC 通道，用于从其他任务接收要发送的消息
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(32);

    // 启动一个新任务，专门负责将 MPSC 通道中的消息发送到 WebSocket
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let payload = match serde_json::to_string(&msg) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("序列化消息失败: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(payload.into())).await.is_err() {
                // 发送失败，说明客户端已断开，退出任务
                break;
            }
        }
    });

    let mut context: SessionContext = None;

    // 主循环，处理从客户端接收到的消息
    while let Some(Ok(msg)) = receiver.next().await {
        if let Message::Text(text) = msg {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    handle_client_message(client_msg, &state, &tx, &mut context).await;
                }
                Err(e) => {
                    tracing::warn!("解析消息失败: {}", e);
                    let _ = tx.send(ServerMessage::Error { message: format!("无法解析的消息: {}", e) }).await;
                }
            }
        }
    }

    // 客户端断开连接，执行清理工作
    if let Some((game_key, player_name)) = context {
        handle_disconnect(&state, &game_key, &player_name);
    }
    info!("客户端连接关闭");
}

/// 核心消息处理逻辑
async fn handle_client_message(
    msg: ClientMessage,
    state: &SharedState,
    tx: &mpsc::Sender<ServerMessage>,
    context: &mut SessionContext,
) {
    let lobby = &state.lobby;
    match msg {
        ClientMessage::ListGameTypes => {
            let _ = tx.send(ServerMessage::GameTypes { game_types: lobby.game_types() }).await;
        }
        ClientMessage::CreateGame { game_type, player_name, settings } => {
            if context.is_some() {
                let _ = tx.send(ServerMessage::Error { message: "你已经在一个游戏里了".to_string() }).await;
                return;
            }
            let joined = lobby
                .create_game(&game_type, &player_name, &settings)
                .and_then(|game_key| lobby.player_view(&game_key, &player_name));
            match joined {
                Ok(view) => enter_game(state, tx, context, player_name, view, None).await,
                Err(e) => {
                    let _ = tx.send(ServerMessage::Error { message: e.to_string() }).await;
                }
            }
        }
        ClientMessage::JoinGame { game_key, player_name } => {
            if context.is_some() {
                let _ = tx.send(ServerMessage::Error { message: "你已经在一个游戏里了".to_string() }).await;
                return;
            }
            let joined = lobby
                .join_game(&game_key, &player_name)
                .and_then(|_| lobby.player_view(&game_key, &player_name));
            match joined {
                Ok(view) => {
                    let announce = format!("玩家 {} 加入了游戏", player_name);
                    enter_game(state, tx, context, player_name, view, Some(announce)).await;
                }
                Err(e) => {
                    let _ = tx.send(ServerMessage::Error { message: e.to_string() }).await;
                }
            }
        }
        ClientMessage::Rejoin { game_key, player_name } => {
            if context.is_some() {
                let _ = tx.send(ServerMessage::Error { message: "你已经在一个游戏里了".to_string() }).await;
                return;
            }
            match lobby.rejoin_game(&game_key, &player_name) {
                Ok(view) => {
                    let announce = format!("玩家 {} 重新连接了游戏", player_name);
                    enter_game(state, tx, context, player_name, view, Some(announce)).await;
                }
                Err(e) => {
                    let _ = tx.send(ServerMessage::Error { message: e.to_string() }).await;
                }
            }
        }
        // ... 其他需要先加入游戏才能执行的消息
        _ => {
            let Some((game_key, player_name)) = context.as_ref() else {
                let _ = tx.send(ServerMessage::Error { message: "请先加入或创建游戏".to_string() }).await;
                return;
            };
            let reply = match msg {
                ClientMessage::DrawCard { deck_name, hand_name } => lobby
                    .draw_for_player(game_key, player_name, &deck_name, hand_name.as_deref())
                    .map(|card| ServerMessage::CardDrawn { card }),
                ClientMessage::CardAction { card_id, action, target_player } => {
                    let target = target_player.unwrap_or_default();
                    let result = lobby
                        .perform_card_action(game_key, player_name, &target, &card_id, &action)
                        .and_then(|_| lobby.player_view(game_key, player_name));
                    if result.is_ok() && action.parse::<CardAction>() == Ok(CardAction::Trade) {
                        notify_trade_target(state, game_key, player_name, &target).await;
                    }
                    result.map(ServerMessage::HandView)
                }
                ClientMessage::QueryPlayers { exclude_player } => lobby
                    .query_players(game_key, exclude_player.as_deref())
                    .map(|players| ServerMessage::Players { players }),
                ClientMessage::RandomCard { filter } => lobby
                    .random_card(game_key, player_name, &filter)
                    .map(|card| ServerMessage::RandomCard { card }),
                ClientMessage::GetHand => lobby
                    .player_view(game_key, player_name)
                    .map(ServerMessage::HandView),
                ClientMessage::ListGameTypes
                | ClientMessage::CreateGame { .. }
                | ClientMessage::JoinGame { .. }
                | ClientMessage::Rejoin { .. } => return,
            };
            let reply = reply.unwrap_or_else(|e| ServerMessage::Error { message: e.to_string() });
            let _ = tx.send(reply).await;
        }
    }
}

/// 交易完成后，把最新的手牌推送给收到卡牌的玩家
async fn notify_trade_target(state: &SharedState, game_key: &str, from_player: &str, target_player: &str) {
    let Ok(view) = state.lobby.player_view(game_key, target_player) else {
        return;
    };
    let sender = state
        .connections
        .get(game_key)
        .and_then(|conns| conns.get(target_player).cloned());
    if let Some(sender) = sender {
        let _ = sender.send(ServerMessage::Info { message: format!("玩家 {} 给了你一张牌", from_player) }).await;
        let _ = sender.send(ServerMessage::HandView(view)).await;
    }
}

/// 登记连接、写入会话上下文，再把玩家视图发回客户端
async fn enter_game(
    state: &SharedState,
    tx: &mpsc::Sender<ServerMessage>,
    context: &mut SessionContext,
    player_name: String,
    view: PlayerView,
    announce: Option<String>,
) {
    // 使用规范化之后的游戏ID
    let game_key = view.game_key.clone();
    if let Err(e) = register_connection(state, &game_key, &player_name, tx.clone()) {
        let _ = tx.send(ServerMessage::Error { message: e.to_string() }).await;
        return;
    }
    *context = Some((game_key.clone(), player_name.clone()));

    // 广播给游戏内其他玩家
    if let Some(message) = announce {
        broadcast(state, &game_key, &ServerMessage::Info { message }, Some(&player_name)).await;
    }
    let _ = tx.send(ServerMessage::GameJoined { game_key, player_name, view }).await;
}

/// 登记玩家的发送通道。
///
/// 与 `handle_disconnect` 在同一个 DashMap 分片锁内完成：
/// 连接表里有这局游戏的条目时，游戏一定还在；没有条目时要先确认游戏没有被最后一个断开的玩家移除。
/// 同一名字已有在线连接时拒绝登记。
fn register_connection(
    state: &SharedState,
    game_key: &str,
    player_name: &str,
    sender: mpsc::Sender<ServerMessage>,
) -> Result<(), CardShareError> {
    match state.connections.entry(game_key.to_string()) {
        Entry::Occupied(mut entry) => {
            let conns = entry.get_mut();
            if conns.contains_key(player_name) {
                return Err(CardShareError::DuplicatePlayerName {
                    game_key: game_key.to_string(),
                    player_name: player_name.to_string(),
                });
            }
            conns.insert(player_name.to_string(), sender);
        }
        Entry::Vacant(entry) => {
            if !state.lobby.store().contains(game_key) {
                return Err(CardShareError::InvalidKey(game_key.to_string()));
            }
            entry.insert(HashMap::from([(player_name.to_string(), sender)]));
        }
    }
    Ok(())
}

/// 玩家断开连接后的处理
fn handle_disconnect(state: &SharedState, game_key: &str, player_name: &str) {
    info!("玩家 {} 从游戏 {} 断开连接", player_name, game_key);

    // 从连接映射中移除。游戏内已没有连接时，在持有分片锁的情况下移除游戏，
    // 这样不会有新连接登记到一局已被删除的游戏上
    state.connections.remove_if_mut(game_key, |_, conns| {
        conns.remove(player_name);
        if conns.is_empty() {
            state.lobby.close_game(game_key);
            true
        } else {
            false
        }
    });
}

/// 向游戏内所有已连接的玩家广播消息
async fn broadcast(state: &SharedState, game_key: &str, message: &ServerMessage, exclude: Option<&str>) {
    // 先复制出发送通道，避免跨 await 持有 DashMap 的引用
    let senders: Vec<(String, mpsc::Sender<ServerMessage>)> = match state.connections.get(game_key) {
        Some(conns) => conns
            .iter()
            .filter(|(name, _)| Some(name.as_str()) != exclude)
            .map(|(name, sender)| (name.clone(), sender.clone()))
            .collect(),
        None => return,
    };
    for (player_name, sender) in senders {
        if sender.send(message.clone()).await.is_err() {
            // 发送失败，说明该玩家也断开了，后续由其自己的 handle_socket 任务处理
            tracing::warn!("向玩家 {} 发送消息失败（可能已断开）", player_name);
        }
    }
}
