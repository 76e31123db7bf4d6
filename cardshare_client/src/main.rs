use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use url::Url;
use uuid::Uuid;

use cardshare_core::{ClientMessage, GameSettings, PlayerView, ServerMessage, catan::GAME_TYPE_CATAN};

#[derive(Parser, Debug)]
#[command(name = "cardshare_client", about = "共享卡牌客户端")]
struct ClientConfig {
    /// 服务器地址
    #[arg(long, env = "CARDSHARE_URL", default_value = "ws://127.0.0.1:25917/ws")]
    url: Url,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::parse();

    println!("正在连接到: {}", config.url);
    let (ws_stream, _) = connect_async(config.url.as_str()).await?;
    println!("连接成功!");

    let (mut write, mut read) = ws_stream.split();

    // 启动一个任务来处理从服务器接收的消息
    tokio::spawn(async move {
        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerMessage>(&text) {
                        Ok(server_msg) => {
                            println!("\n<-- [服务器消息]:\n{}", describe(&server_msg));
                            print!("> "); // 重新显示输入提示符
                            let _ = std::io::stdout().flush();
                        }
                        Err(e) => eprintln!("解析服务器消息失败: {}", e),
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("接收消息时出错: {}", e);
                    break;
                }
            }
        }
    });

    // 主任务处理用户输入
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    println!("--- 共享卡牌客户端 ---");
    println!("可用命令:");
    println!("  types                               - 查询游戏类型");
    println!("  create <昵称> [最大人数] [游戏类型]  - 创建一局新游戏");
    println!("  join <游戏ID> <昵称>                - 加入一局游戏");
    println!("  rejoin <游戏ID> <昵称>              - 断线后回到游戏，取回手牌");
    println!("  draw <牌堆> [手牌组]                - 抽一张牌");
    println!("  discard <卡牌ID>                    - 弃牌");
    println!("  trade <卡牌ID> <玩家>               - 把牌交给其他玩家");
    println!("  players                             - 查看其他玩家");
    println!("  hand                                - 查看自己的手牌");
    println!("  random [过滤条件]                   - 随机选一张自己的牌，例如 hand=-Wood");
    println!("  exit                                - 退出");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = stdin.next_line().await? else {
            break;
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.first() == Some(&"exit") {
            println!("正在断开连接...");
            break;
        }

        match parse_command(&parts) {
            Ok(msg) => {
                let payload = serde_json::to_string(&msg)?;
                write.send(Message::Text(payload.into())).await?;
            }
            Err(usage) => println!("{}", usage),
        }
    }

    Ok(())
}

/// 把一行输入解析为客户端消息，失败时返回提示信息
fn parse_command(parts: &[&str]) -> Result<ClientMessage, String> {
    let arg = |i: usize| parts.get(i).map(|s| s.to_string());
    let card_id = |i: usize| -> Result<Uuid, String> {
        parts.get(i)
            .ok_or_else(|| "缺少卡牌ID".to_string())?
            .parse()
            .map_err(|_| "无效的卡牌ID格式".to_string())
    };

    match parts.first().copied() {
        Some("types") => Ok(ClientMessage::ListGameTypes),
        Some("create") => {
            let player_name = arg(1).ok_or("用法: create <昵称> [最大人数] [游戏类型]")?;
            let max_players = match parts.get(2) {
                Some(n) => n.parse::<usize>().map_err(|_| "无效的人数".to_string())?,
                None => GameSettings::default().max_players,
            };
            let game_type = arg(3).unwrap_or_else(|| GAME_TYPE_CATAN.to_string());
            Ok(ClientMessage::CreateGame { game_type, player_name, settings: GameSettings { max_players } })
        }
        Some("join") => match (arg(1), arg(2)) {
            (Some(game_key), Some(player_name)) => Ok(ClientMessage::JoinGame { game_key, player_name }),
            _ => Err("用法: join <游戏ID> <昵称>".to_string()),
        },
        Some("rejoin") => match (arg(1), arg(2)) {
            (Some(game_key), Some(player_name)) => Ok(ClientMessage::Rejoin { game_key, player_name }),
            _ => Err("用法: rejoin <游戏ID> <昵称>".to_string()),
        },
        Some("draw") => {
            let deck_name = arg(1).ok_or("用法: draw <牌堆> [手牌组]")?;
            Ok(ClientMessage::DrawCard { deck_name, hand_name: arg(2) })
        }
        Some("discard") => Ok(ClientMessage::CardAction {
            card_id: card_id(1)?,
            action: "discard".to_string(),
            target_player: None,
        }),
        Some("trade") => {
            let target = arg(2).ok_or("用法: trade <卡牌ID> <玩家>")?;
            Ok(ClientMessage::CardAction {
                card_id: card_id(1)?,
                action: "trade".to_string(),
                target_player: Some(target),
            })
        }
        Some("players") => Ok(ClientMessage::QueryPlayers { exclude_player: None }),
        Some("hand") => Ok(ClientMessage::GetHand),
        Some("random") => Ok(ClientMessage::RandomCard { filter: arg(1).unwrap_or_default() }),
        Some(other) => Err(format!("未知命令: {}", other)),
        None => Err(String::new()),
    }
}

fn describe(msg: &ServerMessage) -> String {
    match msg {
        ServerMessage::GameTypes { game_types } => format!("游戏类型: {}", game_types.join(", ")),
        ServerMessage::GameJoined { game_key, player_name, view } => {
            format!("{} 已加入游戏 {}\n{}", player_name, game_key, describe_view(view))
        }
        ServerMessage::CardDrawn { card } => format!("抽到: {} - {}", card, card.description),
        ServerMessage::Players { players } => format!("玩家: {}", players.join(", ")),
        ServerMessage::HandView(view) => describe_view(view),
        ServerMessage::RandomCard { card: Some(card) } => format!("随机选中: {}", card),
        ServerMessage::RandomCard { card: None } => "没有符合条件的牌".to_string(),
        ServerMessage::Info { message } => format!("[信息] {}", message),
        ServerMessage::Error { message } => format!("[错误] {}", message),
    }
}

fn describe_view(view: &PlayerView) -> String {
    let mut lines = vec![format!(
        "游戏 {} ({}/{} 人){}",
        view.game_key,
        view.players.len(),
        view.max_players,
        if view.is_owner { " [房主]" } else { "" }
    )];
    for deck in &view.decks {
        if deck.unlimited {
            lines.push(format!("  牌堆 {}: 无限", deck.name));
        } else {
            lines.push(format!("  牌堆 {}: 剩余 {} 张", deck.name, deck.size));
        }
    }
    for hand in &view.hands {
        lines.push(format!("  手牌 {} ({} 张)", hand.name, hand.cards.len()));
        for card in &hand.cards {
            lines.push(format!("    {}", card));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_defaults() {
        match parse_command(&["create", "alice"]).unwrap() {
            ClientMessage::CreateGame { game_type, player_name, settings } => {
                assert_eq!(game_type, "Catan");
                assert_eq!(player_name, "alice");
                assert_eq!(settings.max_players, 4);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_parse_trade() {
        let id = Uuid::new_v4().to_string();
        match parse_command(&["trade", id.as_str(), "bob"]).unwrap() {
            ClientMessage::CardAction { card_id, action, target_player } => {
                assert_eq!(card_id.to_string(), id);
                assert_eq!(action, "trade");
                assert_eq!(target_player.as_deref(), Some("bob"));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejoin() {
        match parse_command(&["rejoin", "abcde", "bob"]).unwrap() {
            ClientMessage::Rejoin { game_key, player_name } => {
                assert_eq!(game_key, "abcde");
                assert_eq!(player_name, "bob");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command(&["join", "ABCDE"]).is_err());
        assert!(parse_command(&["rejoin", "ABCDE"]).is_err());
        assert!(parse_command(&["discard", "not-a-uuid"]).is_err());
        assert!(parse_command(&["create", "alice", "many"]).is_err());
        assert!(parse_command(&["fly"]).is_err());
    }
}
