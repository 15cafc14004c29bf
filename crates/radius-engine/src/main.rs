use clap::Parser;
use radius_codec::{Code, Codec, CodecTableBuilder, RadiusPacket, Value};
use radius_engine::{dictfile, Config, RadiusServer, SecretProvider};
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RADIUS protocol engine - RFC 2865/2866 packet server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "radius-engine")]
struct Cli {
    /// Path to configuration file
    #[arg(value_name = "CONFIG", default_value = "config.json")]
    config_path: String,

    /// Validate configuration and exit (doesn't start the server)
    #[arg(short, long)]
    validate: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing_subscriber::registry()
                .with(EnvFilter::new("info"))
                .with(tracing_subscriber::fmt::layer())
                .init();

            if cli.validate {
                eprintln!("Configuration validation failed: {}", e);
                process::exit(1);
            }

            warn!("Could not load config file from: {}", cli.config_path);
            info!("Creating example configuration at: {}", cli.config_path);

            let example = Config::example();
            if let Err(e) = example.to_file(&cli.config_path) {
                error!("Error creating example config: {}", e);
                process::exit(1);
            }

            info!("Please edit {} and restart the server", cli.config_path);
            process::exit(0);
        }
    };

    if cli.validate {
        println!("Configuration validated successfully");
        println!();
        println!("  Listen: {} (auth {}, acct {})", config.listen_address, config.auth_port, config.acct_port);
        println!("  Clients: {}", config.clients.len());
        println!("  Channel capacity: {}", config.channel_capacity);
        println!("  Attribute dictionary: {}", config.radius_dictionary.as_deref().unwrap_or("(built-in)"));
        println!("  Vendor dictionary: {}", config.vendor_dictionary.as_deref().unwrap_or("(built-in)"));
        process::exit(0);
    }

    let log_level = config.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("RADIUS engine v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from: {}", cli.config_path);

    let attributes = match dictfile::load_attributes(config.radius_dictionary.as_deref()) {
        Ok(attrs) => attrs,
        Err(e) => {
            error!("Unable to read RADIUS dictionary: {}", e);
            process::exit(1);
        }
    };
    let vendors = match dictfile::load_vendors(config.vendor_dictionary.as_deref()) {
        Ok(vendors) => vendors,
        Err(e) => {
            error!("Unable to read vendor dictionary: {}", e);
            process::exit(1);
        }
    };

    let codec = match Codec::new(attributes, vendors, CodecTableBuilder::new().build()) {
        Ok(codec) => Arc::new(codec),
        Err(e) => {
            error!("Invalid dictionary: {}", e);
            process::exit(1);
        }
    };

    let secrets: Arc<dyn SecretProvider> = Arc::new(config.clone());

    let auth_addr = match config.auth_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };
    let acct_addr = match config.acct_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let (auth_server, mut auth_packets) = match RadiusServer::start(
        auth_addr,
        Arc::clone(&codec),
        Arc::clone(&secrets),
        config.channel_capacity,
    )
    .await
    {
        Ok(started) => started,
        Err(e) => {
            error!("Failed to start authentication server: {}", e);
            process::exit(1);
        }
    };

    let (acct_server, mut acct_packets) = match RadiusServer::start(
        acct_addr,
        Arc::clone(&codec),
        Arc::clone(&secrets),
        config.channel_capacity,
    )
    .await
    {
        Ok(started) => started,
        Err(e) => {
            error!("Failed to start accounting server: {}", e);
            process::exit(1);
        }
    };

    info!("Server started successfully, press Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                auth_server.shutdown();
                acct_server.shutdown();
                break;
            }
            Some(packet) = auth_packets.recv() => handle_auth(&auth_server, packet).await,
            Some(packet) = acct_packets.recv() => handle_acct(&acct_server, packet).await,
            else => break,
        }
    }
}

fn log_avps(packet: &RadiusPacket) {
    info!("Got packet: {}", packet);
    for avp in &packet.avps {
        match &avp.value {
            Some(value) => info!("  {} = {}", avp.name, value),
            None => info!("  {} (undecoded)", avp.name),
        }
    }
}

async fn handle_auth(server: &RadiusServer, packet: RadiusPacket) {
    log_avps(&packet);

    if packet.code == Code::AccessRequest {
        let username = packet
            .find_avp("User-Name")
            .and_then(|avp| avp.value.as_ref())
            .and_then(Value::as_text)
            .unwrap_or("<missing>");
        let password_decoded = packet
            .find_avp("User-Password")
            .and_then(|avp| avp.value.as_ref())
            .and_then(Value::as_password)
            .is_some();
        info!(username, password_decoded, "Answering with Access-Accept");

        let mut reply = packet.reply(Code::AccessAccept);
        // Proxy-State attributes are echoed back (RFC 2865 Section 5.33).
        for avp in packet.find_all_avps("Proxy-State") {
            reply.add_avp(avp.clone());
        }
        if let Err(e) = server.send(&reply).await {
            warn!("Failed to send Access-Accept: {}", e);
        }
    }
}

async fn handle_acct(server: &RadiusServer, packet: RadiusPacket) {
    log_avps(&packet);

    if !packet.verify_authenticator() {
        warn!("Accounting authenticator verification failed for {}", packet);
        return;
    }
    info!("Accounting authenticator verified");

    if packet.code == Code::AccountingRequest {
        let mut reply = packet.reply(Code::AccountingResponse);
        for avp in packet.find_all_avps("Proxy-State") {
            reply.add_avp(avp.clone());
        }
        if let Err(e) = server.send(&reply).await {
            warn!("Failed to send Accounting-Response: {}", e);
        }
    }
}
