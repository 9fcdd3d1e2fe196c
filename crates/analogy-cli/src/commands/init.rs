//! The `analogy init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("analogy.toml").exists() {
        println!("analogy.toml already exists, skipping.");
    } else {
        std::fs::write("analogy.toml", SAMPLE_CONFIG)?;
        println!("Created analogy.toml");
    }

    std::fs::create_dir_all("data")?;
    let bank_path = Path::new("data/analogies_items_private.json");
    if bank_path.exists() {
        println!("data/analogies_items_private.json already exists, skipping.");
    } else {
        std::fs::write(bank_path, SAMPLE_BANK)?;
        println!("Created data/analogies_items_private.json");
    }

    println!("\nNext steps:");
    println!("  1. Replace the sample bank with your items");
    println!("  2. Run: analogy validate");
    println!("  3. Run: analogy review    (or: analogy take)");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# analogy configuration

# Local path or http(s) URL of the item bank.
bank = "./data/analogies_items_private.json"
output_dir = "./analogy-results"

# "TR" or "EN"
default_lang = "TR"
dev_mode = false

# ROTATION items mixed into a `take` form.
rotation_sample_size = 8
# Pause after an answer before `take` moves on; 0 disables.
auto_advance_ms = 350
request_timeout_secs = 30
"#;

const SAMPLE_BANK: &str = r#"{
  "meta": { "bank_version": "sample-1" },
  "items": [
    {
      "ITEM_ID": "AN01", "ITEM_TYPE": "FIXED", "P_PLUS": 0.81, "MAJORITY_TAG": "function",
      "STEM_TR": "kuş : uçmak", "STEM_EN": "bird : fly",
      "A_TR": "balık : yüzmek", "A_EN": "fish : swim",
      "B_TR": "ağaç : büyümek", "B_EN": "tree : grow",
      "C_TR": "taş : düşmek", "C_EN": "stone : fall",
      "D_TR": "kedi : uyumak", "D_EN": "cat : sleep",
      "E_TR": "rüzgar : esmek", "E_EN": "wind : blow",
      "ANSWER_KEY": "A"
    },
    {
      "ITEM_ID": "AN02", "ITEM_TYPE": "FIXED", "P_PLUS": 0.64, "MAJORITY_TAG": "part-whole",
      "STEM_TR": "sayfa : kitap", "STEM_EN": "page : book",
      "A_TR": "kalem : yazı", "A_EN": "pen : writing",
      "B_TR": "tuğla : duvar", "B_EN": "brick : wall",
      "C_TR": "su : deniz", "C_EN": "water : sea",
      "D_TR": "göz : yüz", "D_EN": "eye : face",
      "E_TR": "yol : araba", "E_EN": "road : car",
      "ANSWER_KEY": "B"
    },
    {
      "ITEM_ID": "AN10", "ITEM_TYPE": "FIXED", "P_PLUS": 0.47, "MAJORITY_TAG": "degree",
      "STEM_TR": "ılık : sıcak", "STEM_EN": "warm : hot",
      "A_TR": "serin : soğuk", "A_EN": "cool : cold",
      "B_TR": "uzun : kısa", "B_EN": "long : short",
      "C_TR": "hızlı : yavaş", "C_EN": "fast : slow",
      "D_TR": "yeni : eski", "D_EN": "new : old",
      "E_TR": "açık : kapalı", "E_EN": "open : closed",
      "ANSWER_KEY": "A"
    },
    {
      "ITEM_ID": "RT01", "ITEM_TYPE": "ROTATION", "P_PLUS": 0.52,
      "ROTATION_REASON": "culturally loaded in TR",
      "STEM_TR": "çay : demlik", "STEM_EN": "tea : teapot",
      "A_TR": "kahve : cezve", "A_EN": "coffee : pot",
      "B_TR": "ekmek : fırın", "B_EN": "bread : oven",
      "C_TR": "su : bardak", "C_EN": "water : glass",
      "D_TR": "süt : inek", "D_EN": "milk : cow",
      "E_TR": "bal : arı", "E_EN": "honey : bee"
    },
    {
      "ITEM_ID": "RT02", "ITEM_TYPE": "ROTATION", "P_PLUS": 0.38,
      "ROTATION_REASON": "translation drift",
      "STEM_TR": "usta : çırak", "STEM_EN": "master : apprentice",
      "A_TR": "öğretmen : öğrenci", "A_EN": "teacher : student",
      "B_TR": "doktor : hasta", "B_EN": "doctor : patient",
      "C_TR": "baba : oğul", "C_EN": "father : son",
      "D_TR": "patron : işçi", "D_EN": "boss : worker",
      "E_TR": "yazar : okur", "E_EN": "author : reader"
    }
  ]
}
"#;
