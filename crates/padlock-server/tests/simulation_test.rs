//! Multi-client scenarios on a simulated network.
//!
//! turmoil drives every host on simulated time, so "Alice holds the lock for
//! a second" costs nothing and the interleaving is deterministic. The server
//! host runs the same per-connection sessions as the real binary over
//! turmoil sockets.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use padlock_client::LockClient;
use padlock_core::{ConnectionIdGenerator, LockTable, Session, SessionConfig, Shutdown};
use padlock_proto::{DEFAULT_PORT, ResourceName};
use turmoil::net::{TcpListener, TcpStream};

type Events = Arc<Mutex<Vec<String>>>;

fn server_host(sim: &mut turmoil::Sim<'_>, table: Arc<LockTable>) {
    sim.host("server", move || {
        let table = Arc::clone(&table);
        async move {
            let listener = TcpListener::bind(("0.0.0.0", DEFAULT_PORT)).await?;
            let ids = ConnectionIdGenerator::new();
            let (_trigger, shutdown) = Shutdown::channel();

            loop {
                let (stream, _) = listener.accept().await?;
                let (reader, writer) = tokio::io::split(stream);
                let mut session = Session::new(
                    ids.next_id(),
                    Arc::clone(&table),
                    reader,
                    writer,
                    shutdown.clone(),
                    &SessionConfig::default(),
                );
                tokio::spawn(async move { session.run().await });
            }
        }
    });
}

async fn connect() -> Result<LockClient<TcpStream>, Box<dyn std::error::Error>> {
    // Give the server host a moment to bind.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let stream = TcpStream::connect(("server", DEFAULT_PORT)).await?;
    Ok(LockClient::new(stream))
}

fn record(events: &Events, event: &str) {
    events.lock().unwrap().push(event.to_owned());
}

fn name(s: &str) -> ResourceName {
    ResourceName::new(s).unwrap()
}

#[test]
fn contended_lock_is_handed_over_on_release() -> turmoil::Result {
    let mut sim = turmoil::Builder::new().build();
    let table = Arc::new(LockTable::new());
    let events = Events::default();
    server_host(&mut sim, Arc::clone(&table));

    let log = Arc::clone(&events);
    sim.client("alice", async move {
        let mut client = connect().await?;
        client.lock(&name("foo")).await?;
        record(&log, "alice locked");

        tokio::time::sleep(Duration::from_secs(1)).await;

        record(&log, "alice unlocking");
        client.unlock(&name("foo")).await?;
        client.quit().await?;
        Ok(())
    });

    let log = Arc::clone(&events);
    sim.client("bob", async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mut client = connect().await?;
        client.lock(&name("foo")).await?;
        record(&log, "bob locked");
        client.unlock(&name("foo")).await?;
        client.quit().await?;
        Ok(())
    });

    sim.run()?;

    let events = events.lock().unwrap();
    assert_eq!(*events, ["alice locked", "alice unlocking", "bob locked"]);
    assert_eq!(table.holder("foo"), None);
    Ok(())
}

#[test]
fn holder_that_vanishes_does_not_strand_waiters() -> turmoil::Result {
    let mut sim = turmoil::Builder::new().build();
    let table = Arc::new(LockTable::new());
    let events = Events::default();
    server_host(&mut sim, Arc::clone(&table));

    let log = Arc::clone(&events);
    sim.client("alice", async move {
        let mut client = connect().await?;
        client.lock(&name("foo")).await?;
        record(&log, "alice locked");
        tokio::time::sleep(Duration::from_millis(500)).await;
        record(&log, "alice gone");
        drop(client);
        Ok(())
    });

    let log = Arc::clone(&events);
    sim.client("bob", async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mut client = connect().await?;
        client.lock(&name("foo")).await?;
        record(&log, "bob locked");
        client.quit().await?;
        Ok(())
    });

    sim.run()?;

    let events = events.lock().unwrap();
    assert_eq!(*events, ["alice locked", "alice gone", "bob locked"]);
    Ok(())
}

#[test]
fn many_clients_take_turns() -> turmoil::Result {
    let mut sim = turmoil::Builder::new().build();
    let table = Arc::new(LockTable::new());
    let events = Events::default();
    server_host(&mut sim, Arc::clone(&table));

    for client_name in ["c1", "c2", "c3", "c4", "c5"] {
        let log = Arc::clone(&events);
        sim.client(client_name, async move {
            let mut client = connect().await?;
            client.lock(&name("counter")).await?;
            record(&log, "enter");
            tokio::time::sleep(Duration::from_millis(50)).await;
            record(&log, "leave");
            client.unlock(&name("counter")).await?;
            client.quit().await?;
            Ok(())
        });
    }

    sim.run()?;

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 10);
    for pair in events.chunks(2) {
        assert_eq!(pair, ["enter", "leave"]);
    }
    Ok(())
}
