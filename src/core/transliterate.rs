//! Phonetic index for locales searched by pronunciation.
//!
//! For Chinese locales the front end lets players search item names by
//! pinyin. The index maps each display-name key of the translation table to
//! the romanized form of its translation.
//!
//! Text is segmented into words first. A character with several readings
//! takes the reading of the word it belongs to when that word is listed in
//! `WORD_READINGS`, and its most common reading otherwise.

use std::sync::LazyLock;

use indexmap::IndexSet;
use jieba_rs::Jieba;
use pinyin::ToPinyin;
use regex::Regex;
use serde_json::{Map, Value};

use crate::core::catalog::{TranslationTable, TransliterationTable};

/// Fields of a structured name record that hold displayable forms.
const NAME_FORMS: [&str; 3] = ["str", "str_sp", "str_pl"];

/// Words whose characters do not take their most common reading.
const WORD_READINGS: &[(&str, &str)] = &[
    ("银行", "yin hang"),
    ("行业", "hang ye"),
    ("长矛", "chang mao"),
    ("长剑", "chang jian"),
    ("长弓", "chang gong"),
    ("长枪", "chang qiang"),
    ("长刀", "chang dao"),
    ("长棍", "chang gun"),
    ("长袍", "chang pao"),
    ("长裤", "chang ku"),
    ("长袖", "chang xiu"),
    ("长柄", "chang bing"),
    ("长筒", "chang tong"),
    ("长度", "chang du"),
    ("长途", "chang tu"),
    ("弹簧", "tan huang"),
    ("弹性", "tan xing"),
    ("弹力", "tan li"),
    ("弹奏", "tan zou"),
    ("重复", "chong fu"),
    ("重新", "chong xin"),
    ("音乐", "yin yue"),
    ("乐器", "yue qi"),
    ("睡觉", "shui jiao"),
    ("着火", "zhao huo"),
    ("空调", "kong tiao"),
    ("调料", "tiao liao"),
    ("调味", "tiao wei"),
    ("宝藏", "bao zang"),
    ("大夫", "dai fu"),
    ("薄荷", "bo he"),
    ("便宜", "pian yi"),
    ("补给", "bu ji"),
    ("供给", "gong ji"),
    ("人参", "ren shen"),
    ("削皮", "xiao pi"),
    ("模样", "mu yang"),
    ("瓶塞", "ping sai"),
    ("传记", "zhuan ji"),
    ("刨子", "bao zi"),
];

static SEGMENTER: LazyLock<Jieba> = LazyLock::new(Jieba::new);

/// Decides which locales get a phonetic index.
#[derive(Debug, Clone)]
pub struct PhoneticLocales {
    pattern: Regex,
}

impl PhoneticLocales {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn matches(&self, locale: &str) -> bool {
        self.pattern.is_match(locale)
    }
}

/// Display-name strings of `entries`, deduplicated, in first-seen order.
///
/// A plain string `name` is taken as is; a name record contributes its
/// `str`, `str_sp` and `str_pl` forms.
pub fn name_candidates<'a, I>(entries: I) -> IndexSet<&'a str>
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    let mut names = IndexSet::new();
    for entry in entries {
        match entry.get("name") {
            Some(Value::String(name)) => {
                names.insert(name.as_str());
            }
            Some(Value::Object(record)) => {
                for form in NAME_FORMS {
                    if let Some(Value::String(name)) = record.get(form) {
                        names.insert(name.as_str());
                    }
                }
            }
            _ => {}
        }
    }
    names.retain(|name| !name.is_empty());
    names
}

/// Build the phonetic index of `table` for the names used by `entries`.
///
/// Names without a translation are skipped. The header is copied as is.
pub fn index<'a, I>(entries: I, table: &TranslationTable) -> TransliterationTable
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    let mut phonetic = TransliterationTable::new(table.header.clone());
    for name in name_candidates(entries) {
        if let Some(translation) = table.get(name) {
            phonetic
                .entries
                .insert(name.to_string(), translation.map(romanize));
        }
    }
    phonetic
}

/// Romanize `text` as space-separated, tone-less pinyin syllables.
///
/// Every Han character becomes one syllable. Runs of other characters are
/// kept verbatim and split on whitespace.
pub fn romanize(text: &str) -> String {
    let mut syllables: Vec<String> = Vec::new();
    let mut run = String::new();

    for word in SEGMENTER.cut(text, true) {
        romanize_word(word, &mut syllables, &mut run);
    }
    flush_run(&mut run, &mut syllables);

    syllables.join(" ")
}

fn romanize_word(word: &str, syllables: &mut Vec<String>, run: &mut String) {
    let mut rest = word;
    while let Some(c) = rest.chars().next() {
        if let Some((listed, reading)) = listed_word_at(rest) {
            flush_run(run, syllables);
            syllables.extend(reading.split(' ').map(str::to_string));
            rest = &rest[listed.len()..];
            continue;
        }
        match c.to_pinyin() {
            Some(syllable) => {
                flush_run(run, syllables);
                syllables.push(syllable.plain().to_string());
            }
            None => run.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }
}

/// Longest entry of `WORD_READINGS` that `text` starts with.
fn listed_word_at(text: &str) -> Option<(&'static str, &'static str)> {
    WORD_READINGS
        .iter()
        .filter(|(listed, _)| text.starts_with(listed))
        .max_by_key(|(listed, _)| listed.len())
        .copied()
}

fn flush_run(run: &mut String, syllables: &mut Vec<String>) {
    syllables.extend(run.split_whitespace().map(str::to_string));
    run.clear();
}
