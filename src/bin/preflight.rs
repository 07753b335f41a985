use certificate_store::storage::{ImageStore, JsonFileStore, RecordStore};
use certificate_store::ServerConfig;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--init-if-missing]\n\
         \n\
         Reads env vars (all optional):\n\
           BIND_ADDR, PORT, CERTIFICATES_FILE, IMAGES_DIR, MAX_BODY_BYTES\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let init_if_missing = args.iter().any(|a| a == "--init-if-missing");

    // Force-read config (nice error messages if invalid)
    let config = ServerConfig::from_env()?;

    println!("> Preflight:");
    println!("  BIND={}", config.bind);
    println!("  CERTIFICATES_FILE={}", config.store.certificates_file.display());
    println!("  IMAGES_DIR={}", config.store.images_dir.display());
    println!("  MAX_BODY_BYTES={}", config.max_body_bytes);

    // Records file
    let records = JsonFileStore::new(&config.store.certificates_file);
    if !records.exists().await {
        if init_if_missing {
            println!("  Records file missing -> initializing with []...");
            records.init().await?;
        } else {
            return Err(anyhow::anyhow!(
                "{} does not exist. Re-run with --init-if-missing",
                records.path().display()
            ));
        }
    }
    let loaded = records.load().await?;
    println!("  Records file parses ({} certificates).", loaded.len());

    // Images directory
    let images = ImageStore::new(&config.store.images_dir);
    if tokio::fs::metadata(images.root_dir()).await.is_err() {
        if init_if_missing {
            println!("  Images directory missing -> creating...");
            images.init().await?;
        } else {
            return Err(anyhow::anyhow!(
                "{} does not exist. Re-run with --init-if-missing",
                images.root_dir().display()
            ));
        }
    }
    images.check_writable().await?;
    println!("  Images directory is writable.");

    let missing: Vec<&str> = {
        let mut v = Vec::new();
        for c in &loaded {
            if !images.exists(&c.image).await {
                v.push(c.image.as_str());
            }
        }
        v
    };
    if !missing.is_empty() {
        eprintln!("  Warning: {} record(s) reference missing images:", missing.len());
        for m in &missing {
            eprintln!("    {}", m);
        }
    }

    println!("> Preflight OK.");
    Ok(())
}
