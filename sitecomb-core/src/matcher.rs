use std::collections::{HashMap, HashSet};

/// A staging URL paired with the public URL it most resembles.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectMatch {
    pub staging_url: String,
    pub matched_public_url: String,
    pub similarity: f64,
}

/// Keywords of a URL: its path/query tokens longer than two characters that
/// are not purely numeric, lowercased and space-joined.
pub fn url_keywords(url: &str) -> String {
    url.split(['/', ':', '.', '_', '-', '?', '=', '&'])
        .map(|token| token.to_lowercase())
        .filter(|token| token.chars().count() > 2 && !token.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Match every staging URL to its most similar public URL by TF-IDF cosine
/// similarity over the combined keyword corpus. Ties resolve to the first
/// candidate.
pub fn match_redirects(staging_urls: &[String], public_urls: &[String]) -> Vec<RedirectMatch> {
    if public_urls.is_empty() {
        return Vec::new();
    }

    let staging_docs: Vec<String> = staging_urls.iter().map(|u| url_keywords(u)).collect();
    let public_docs: Vec<String> = public_urls.iter().map(|u| url_keywords(u)).collect();

    let all_docs: Vec<Vec<&str>> = staging_docs
        .iter()
        .chain(public_docs.iter())
        .map(|doc| tokenize(doc))
        .collect();
    let idf = inverse_document_frequencies(&all_docs);

    let public_vectors: Vec<_> = public_docs
        .iter()
        .map(|doc| tfidf_vector(&tokenize(doc), &idf))
        .collect();

    staging_urls
        .iter()
        .zip(&staging_docs)
        .map(|(staging_url, doc)| {
            let vector = tfidf_vector(&tokenize(doc), &idf);

            let mut best_index = 0;
            let mut best_score = -1.0;
            for (i, candidate) in public_vectors.iter().enumerate() {
                let score = cosine_similarity(&vector, candidate);
                if score > best_score {
                    best_score = score;
                    best_index = i;
                }
            }

            RedirectMatch {
                staging_url: staging_url.clone(),
                matched_public_url: public_urls[best_index].clone(),
                similarity: best_score,
            }
        })
        .collect()
}

/// Read staging/public URL pairs from the first two columns of a CSV file.
/// Rows with an empty cell are dropped.
pub fn load_url_pairs(path: &str) -> Result<(Vec<String>, Vec<String>), csv::Error> {
    let expanded = shellexpand::tilde(path).into_owned();
    let mut reader = csv::Reader::from_path(expanded)?;

    let mut staging = Vec::new();
    let mut public = Vec::new();
    for result in reader.records() {
        let record = result?;
        match (record.get(0), record.get(1)) {
            (Some(s), Some(p)) if !s.trim().is_empty() && !p.trim().is_empty() => {
                staging.push(s.trim().to_string());
                public.push(p.trim().to_string());
            }
            _ => {}
        }
    }

    Ok((staging, public))
}

pub fn generate_matches_csv(matches: &[RedirectMatch]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["staging_url", "matched_public_url", "similarity_score"])?;
    for entry in matches {
        let score = format!("{:.4}", entry.similarity);
        writer.write_record([
            entry.staging_url.as_str(),
            entry.matched_public_url.as_str(),
            score.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn tokenize(doc: &str) -> Vec<&str> {
    doc.split_whitespace().collect()
}

// Smoothed idf: ln((1 + n) / (1 + df)) + 1
fn inverse_document_frequencies(documents: &[Vec<&str>]) -> HashMap<String, f64> {
    let n = documents.len() as f64;
    let mut frequencies: HashMap<&str, usize> = HashMap::new();
    for doc in documents {
        let unique: HashSet<&str> = doc.iter().copied().collect();
        for term in unique {
            *frequencies.entry(term).or_insert(0) += 1;
        }
    }

    frequencies
        .into_iter()
        .map(|(term, df)| {
            let weight = ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0;
            (term.to_string(), weight)
        })
        .collect()
}

fn tfidf_vector(doc: &[&str], idf: &HashMap<String, f64>) -> HashMap<String, f64> {
    let mut counts: HashMap<&str, f64> = HashMap::new();
    for term in doc {
        *counts.entry(term).or_insert(0.0) += 1.0;
    }

    let mut vector: HashMap<String, f64> = counts
        .into_iter()
        .filter_map(|(term, count)| idf.get(term).map(|w| (term.to_string(), count * w)))
        .collect();

    let norm = vector.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in vector.values_mut() {
            *value /= norm;
        }
    }
    vector
}

// Both vectors are unit length, so the dot product is the cosine
fn cosine_similarity(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    a.iter()
        .filter_map(|(term, va)| b.get(term).map(|vb| va * vb))
        .sum()
}
