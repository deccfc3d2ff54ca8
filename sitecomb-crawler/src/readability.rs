/// Flesch-Kincaid grade level of `text`, rounded to two decimal places.
///
/// Sentences split on runs of '.', '!' and '?'; words are lowercased
/// alphanumeric runs; syllables are approximated by counting vowel groups
/// per word after dropping a trailing 'e', with a floor of one. Returns 0.0
/// when there are no words or no sentences.
pub fn grade_level(text: &str) -> f64 {
    let num_sentences = count_sentences(text);
    let words = split_words(text);
    let num_words = words.len();

    if num_words == 0 || num_sentences == 0 {
        return 0.0;
    }

    let num_syllables: usize = words.iter().map(|word| count_syllables(word)).sum();

    let score = 0.39 * (num_words as f64 / num_sentences as f64)
        + 11.8 * (num_syllables as f64 / num_words as f64)
        - 15.59;

    (score * 100.0).round() / 100.0
}

fn count_sentences(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|segment| !segment.trim().is_empty())
        .count()
}

fn split_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn count_syllables(word: &str) -> usize {
    let trimmed = word.strip_suffix('e').unwrap_or(word);

    // Consecutive vowels count as one group
    let mut count = 0;
    let mut in_group = false;
    for c in trimmed.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !in_group {
            count += 1;
        }
        in_group = vowel;
    }

    count.max(1)
}
