//! Headless test client: connects, walks toward the first objective, and
//! prints phase transitions and capture counts from the snapshot stream.

use bincode::{deserialize, serialize};
use shared::{CollectibleState, Packet, Position};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Client socket bound to {}", socket.local_addr()?);

    let server_addr = "127.0.0.1:8080".parse::<SocketAddr>()?;

    // Connect handshake
    let connect = Packet::Connect { client_version: 1 };
    socket.send_to(&serialize(&connect)?, server_addr).await?;
    println!("Sent connection request to {}", server_addr);

    let mut buf = [0u8; 65536];
    let (len, _) = socket.recv_from(&mut buf).await?;

    let (my_id, mut my_position, target) = match deserialize::<Packet>(&buf[0..len])? {
        Packet::Connected {
            participant_id,
            participants,
            objectives,
        } => {
            println!(
                "Connected as participant {} ({} others, {} objectives)",
                participant_id,
                participants.len().saturating_sub(1),
                objectives.len()
            );
            let position = participants
                .get(&participant_id)
                .copied()
                .unwrap_or(Position::new(0.5, 0.5));
            let target = objectives
                .first()
                .map(|objective| objective.center)
                .unwrap_or(Position::new(0.5, 0.5));
            (participant_id, position, target)
        }
        Packet::Rejected { reason } => {
            println!("Connection rejected: {}", reason);
            return Ok(());
        }
        other => {
            println!("Unexpected handshake packet: {:?}", other);
            return Ok(());
        }
    };

    let mut last_phase = String::new();
    let mut send_interval = tokio::time::interval(Duration::from_millis(100));

    loop {
        send_interval.tick().await;

        // Walk toward the objective center
        let step = 0.01f32;
        let dx = target.x - my_position.x;
        let dy = target.y - my_position.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist > 0.001 {
            my_position.x += dx / dist * step.min(dist);
            my_position.y += dy / dist * step.min(dist);
        }
        let update = Packet::PositionUpdate {
            x: my_position.x,
            y: my_position.y,
        };
        socket.send_to(&serialize(&update)?, server_addr).await?;

        // Drain whatever snapshots arrived since the last step
        while let Ok(Ok((len, _))) =
            timeout(Duration::from_millis(10), socket.recv_from(&mut buf)).await
        {
            match deserialize::<Packet>(&buf[0..len]) {
                Ok(Packet::Snapshot {
                    tick,
                    participants,
                    objectives,
                    field,
                    ..
                }) => {
                    // The server may relocate us during lockback
                    if let Some(position) = participants.get(&my_id) {
                        my_position = *position;
                    }

                    if let Some(objective) = objectives.first() {
                        let phase = objective.phase.label().to_string();
                        if phase != last_phase {
                            let captured = field
                                .collectibles
                                .iter()
                                .filter(|collectible| {
                                    matches!(
                                        collectible.state,
                                        CollectibleState::Captured { captured_by } if captured_by == my_id
                                    )
                                })
                                .count();
                            println!(
                                "tick {}: objective {} is now {} (group {:?}, my captures {})",
                                tick, objective.name, phase, objective.current_group, captured
                            );
                            last_phase = phase;
                        }
                    }
                }
                Ok(Packet::ParticipantJoined { id, .. }) => {
                    println!("Participant {} joined", id);
                }
                Ok(Packet::ParticipantLeft { id }) => {
                    println!("Participant {} left", id);
                }
                Ok(_) => {}
                Err(e) => println!("Failed to decode packet: {}", e),
            }
        }
    }
}
