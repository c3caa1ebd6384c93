use rayon::prelude::*;

use xmltok::{OwnedToken, TokenPool, Tokenizer};

static POOL: TokenPool = TokenPool::new();

fn row(i: usize) -> String {
    format!("<row r=\"{i}\"><c t=\"s\"><v>{i}</v></c><c><v>{}</v></c></row>", i * 2)
}

/// Sum every `<v>` inside each `<row>`, holding a pooled copy of the row tag.
fn sum_rows(doc: &[u8], pool: &TokenPool) -> Vec<(usize, u64)> {
    let mut tok = Tokenizer::new(doc);
    let mut rows = Vec::new();
    while let Some(token) = tok.next_token().unwrap() {
        if token.name().local != b"row" || token.is_end_element() {
            continue;
        }
        let start: OwnedToken = pool.acquire_copy(&token);
        let mut total = 0u64;
        while let Some(token) = tok.next_token().unwrap() {
            if token.is_end_element_of(&start.as_token()) {
                break;
            }
            if token.name().local == b"v" && !token.is_end_element() {
                total += token.data_str().unwrap().parse::<u64>().unwrap();
            }
        }
        let r = start.as_token().attr(b"r").unwrap();
        rows.push((std::str::from_utf8(r).unwrap().parse().unwrap(), total));
        pool.release(start);
    }
    rows
}

#[test]
fn test_shared_pool_across_threads() {
    let docs: Vec<Vec<u8>> = (0..64)
        .map(|d| {
            let mut doc = String::from("<sheetData>");
            for i in 0..50 {
                doc.push_str(&row(d * 50 + i));
            }
            doc.push_str("</sheetData>");
            doc.into_bytes()
        })
        .collect();

    let results: Vec<Vec<(usize, u64)>> = docs
        .par_iter()
        .map(|doc| sum_rows(doc, &POOL))
        .collect();

    for (d, rows) in results.iter().enumerate() {
        assert_eq!(rows.len(), 50);
        for (i, &(r, total)) in rows.iter().enumerate() {
            let expected = d * 50 + i;
            assert_eq!(r, expected);
            assert_eq!(total, 3 * expected as u64);
        }
    }

    // At most one copy per worker is ever outstanding
    let idle = POOL.idle();
    assert!(idle >= 1);
    assert!(idle <= rayon::current_num_threads());
}
