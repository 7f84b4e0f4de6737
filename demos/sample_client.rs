//! Build CONNECT and SUBSCRIBE packets, then run them back through the
//! dispatcher. Pass a broker address (e.g. `127.0.0.1:1883`) to also send
//! them over TCP and print the broker's replies.

use mqtt_wire::transport::StreamTransport;
use mqtt_wire::{
    ConnectMessage, Message, QoS, Session, SessionConfig, SubscribeMessage, TransportError,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("MQTT Wire Sample Client");
    println!("=======================\n");

    let mut connect: Message = ConnectMessage::new("sample-client").with_keep_alive(30).into();
    let mut subscribe: Message =
        SubscribeMessage::single(1, "sensors/temp", QoS::AtLeastOnce).into();

    for message in [&mut connect, &mut subscribe] {
        let encoded = message.encode()?;
        println!(
            "{} encoded to {} bytes: {:02x?}",
            message.packet_type(),
            encoded.len(),
            encoded.as_ref()
        );

        let decoded = Message::decode(encoded)?;
        println!("Decoded back as {}\n", decoded.packet_type());
    }

    let Some(addr) = std::env::args().nth(1) else {
        return Ok(());
    };

    let transport = StreamTransport::connect(addr.as_str())?;
    let config = SessionConfig {
        client_id: "sample-client".to_owned(),
        ..SessionConfig::default()
    };
    let mut session = Session::new(transport, config);
    session.connect()?;
    session.subscribe(vec![mqtt_wire::Subscription::new("sensors/#", QoS::AtLeastOnce)])?;
    session.publish("sensors/temp", "21.5", QoS::AtMostOnce, false)?;

    loop {
        match session.poll(|message| println!("Received: {message:?}")) {
            Ok(_) => {}
            Err(TransportError::Closed) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
