use std::collections::HashSet;

use tantivy::{
    Index,
    IndexReader,
    IndexWriter,
    ReloadPolicy,
    TantivyDocument,
    Term,
    collector::TopDocs,
    query::{BooleanQuery, Occur, Query, RegexQuery, TermQuery},
    schema::{
        Field,
        IndexRecordOption,
        STORED,
        STRING,
        Schema,
        TextFieldIndexing,
        TextOptions,
        Value,
    },
    tokenizer::{
        LowerCaser,
        RemoveLongFilter,
        SimpleTokenizer,
        TextAnalyzer,
        TokenStream,
    },
};
use tracing::{debug, warn};

use crate::{
    config::{EngineConfig, MatchMode},
    error::Result,
    normalize::NormalizedDocument,
};

/// Name under which the text analyzer is registered.
pub const ANALYZER: &str = "docdex_text";

const ID_FIELD: &str = "_id";
const PAYLOAD_FIELD: &str = "_payload";

/// One index entry matched by a field query.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub doc_id: String,
    pub payload: String,
}

/// In-memory Tantivy index over a field set fixed at creation.
///
/// Every document is appended as a new entry; entries are never updated or
/// removed individually.
pub struct FieldIndex {
    reader: IndexReader,
    writer: IndexWriter,
    analyzer: TextAnalyzer,
    fields: Vec<(String, Field)>,
    id_field: Field,
    payload_field: Field,
    match_mode: MatchMode,
    partial_match: bool,
    /// Entries whose identifier was already indexed.
    shadowed: usize,
    #[cfg(test)]
    fail_writes: bool,
    #[cfg(test)]
    fail_searches: bool,
}

fn build_analyzer(max_token_len: usize) -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(max_token_len))
        .filter(LowerCaser)
        .build()
}

impl FieldIndex {
    /// Create an empty index searching over `fields`.
    ///
    /// Document keys are mapped to positional schema names (`f0`, `f1`, ...)
    /// so any key can be indexed. Reserved and repeated names are skipped
    /// with a warning.
    pub fn create(fields: &[String], config: &EngineConfig) -> Result<Self> {
        let mut builder = Schema::builder();
        let id_field = builder.add_text_field(ID_FIELD, STRING | STORED);
        let payload_field = builder
            .add_text_field(PAYLOAD_FIELD, TextOptions::default().set_stored());

        let text_opts = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(ANALYZER)
                .set_index_option(IndexRecordOption::WithFreqs),
        );

        let mut taken: HashSet<&str> = config.reserved_fields().into();
        let mut indexed = Vec::with_capacity(fields.len());
        for name in fields {
            if !taken.insert(name.as_str()) {
                warn!(field = %name, "reserved or repeated field, skipping");
                continue;
            }
            let schema_name = format!("f{}", indexed.len());
            let field = builder.add_text_field(&schema_name, text_opts.clone());
            indexed.push((name.clone(), field));
        }

        let index = Index::create_in_ram(builder.build());
        let analyzer = build_analyzer(config.max_token_len);
        index.tokenizers().register(ANALYZER, analyzer.clone());

        let writer: IndexWriter = index.writer(config.writer_memory_bytes)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        debug!(fields = indexed.len(), "created field index");

        Ok(Self {
            reader,
            writer,
            analyzer,
            fields: indexed,
            id_field,
            payload_field,
            match_mode: config.match_mode,
            partial_match: config.partial_match,
            shadowed: 0,
            #[cfg(test)]
            fail_writes: false,
            #[cfg(test)]
            fail_searches: false,
        })
    }

    /// Names of the searchable fields, in creation order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Number of entries, counting every re-indexed identifier again.
    pub fn num_entries(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Append `docs` and make them searchable.
    ///
    /// `shadowed` is how many of them reuse an identifier that is already
    /// indexed. On failure the pending writes are rolled back.
    pub fn insert_batch(
        &mut self,
        docs: &[NormalizedDocument],
        shadowed: usize,
    ) -> Result<()> {
        if let Err(err) = self.write_batch(docs) {
            if let Err(rollback_err) = self.writer.rollback() {
                warn!(error = %rollback_err, "index rollback failed");
            }
            return Err(err);
        }
        self.shadowed += shadowed;
        Ok(())
    }

    fn write_batch(&mut self, docs: &[NormalizedDocument]) -> Result<()> {
        for norm in docs {
            let mut doc = TantivyDocument::default();
            doc.add_text(self.id_field, norm.doc_id());
            doc.add_text(self.payload_field, norm.payload());
            for (name, field) in &self.fields {
                doc.add_text(*field, norm.get(name).unwrap_or(""));
            }
            self.writer.add_document(doc)?;
        }

        #[cfg(test)]
        if self.fail_writes {
            return Err(injected_fault("write").into());
        }

        self.writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }

    /// Split `text` into distinct tokens with the index analyzer.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);
        let mut tokens: Vec<String> = Vec::new();
        while let Some(token) = stream.next() {
            if !tokens.contains(&token.text) {
                tokens.push(token.text.clone());
            }
        }
        tokens
    }

    /// Run `tokens` against each field independently.
    ///
    /// Returns one ranked match list per field, in field order. Each list
    /// holds enough entries to yield `limit` distinct identifiers when the
    /// field has that many.
    pub fn search(
        &self,
        tokens: &[String],
        limit: usize,
    ) -> Result<Vec<Vec<FieldMatch>>> {
        #[cfg(test)]
        if self.fail_searches {
            return Err(injected_fault("search").into());
        }

        let searcher = self.reader.searcher();
        let total = searcher.num_docs() as usize;
        if tokens.is_empty() || limit == 0 || total == 0 {
            return Ok(Vec::new());
        }
        let fetch = limit.saturating_add(self.shadowed).min(total);

        let mut per_field = Vec::with_capacity(self.fields.len());
        for (_, field) in &self.fields {
            let query = self.field_query(*field, tokens)?;
            let top_docs =
                searcher.search(&*query, &TopDocs::with_limit(fetch))?;

            let mut matches = Vec::with_capacity(top_docs.len());
            for (_score, address) in top_docs {
                let doc: TantivyDocument = searcher.doc(address)?;
                matches.push(FieldMatch {
                    doc_id: extract_text(&doc, self.id_field),
                    payload: extract_text(&doc, self.payload_field),
                });
            }
            per_field.push(matches);
        }

        Ok(per_field)
    }

    fn field_query(
        &self,
        field: Field,
        tokens: &[String],
    ) -> Result<Box<dyn Query>> {
        let occur = match self.match_mode {
            MatchMode::Any => Occur::Should,
            MatchMode::All => Occur::Must,
        };

        let mut clauses: Vec<(Occur, Box<dyn Query>)> =
            Vec::with_capacity(tokens.len());
        for token in tokens {
            let query: Box<dyn Query> = if self.partial_match {
                let pattern = format!(".*{}.*", escape_regex(token));
                Box::new(RegexQuery::from_pattern(&pattern, field)?)
            } else {
                Box::new(TermQuery::new(
                    Term::from_field_text(field, token),
                    IndexRecordOption::Basic,
                ))
            };
            clauses.push((occur, query));
        }

        Ok(Box::new(BooleanQuery::new(clauses)))
    }
}

#[cfg(test)]
impl FieldIndex {
    /// Make the next batches fail after staging, before the commit.
    pub(crate) fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub(crate) fn set_fail_searches(&mut self, fail: bool) {
        self.fail_searches = fail;
    }
}

#[cfg(test)]
fn injected_fault(op: &str) -> tantivy::TantivyError {
    tantivy::TantivyError::InternalError(format!("injected {op} failure"))
}

impl std::fmt::Debug for FieldIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldIndex")
            .field("fields", &self.field_names())
            .field("shadowed", &self.shadowed)
            .finish_non_exhaustive()
    }
}

fn escape_regex(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn extract_text(doc: &TantivyDocument, field: Field) -> String {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}
