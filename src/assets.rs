use askama::Template;

pub const FUSE_MODULE_URL: &str = "https://cdn.jsdelivr.net/npm/fuse.js@7.0.0/+esm";
pub const PAKO_MODULE_URL: &str = "https://cdn.jsdelivr.net/npm/pako@2.1.0/+esm";
pub const SEARCH_RESULT_LIMIT: usize = 20;
pub const SEARCH_THRESHOLD: f64 = 0.3;

pub const SEARCH_DATA_FILE: &str = "search-data.js";
pub const SEARCH_DATA_GZ_FILE: &str = "search-data.js.gz";
pub const SEARCH_WORKER_FILE: &str = "search-worker.js";
pub const INDEX_FILE: &str = "index.html";

/// Module worker answering `{ id, query }` messages against the search payload.
#[derive(Template)]
#[template(
    source = r#"import Fuse from "{{ fuse_url }}";

const DATA_GZ = "./{{ data_gz_file }}";
const DATA_PLAIN = "./{{ data_file }}";
const RESULT_LIMIT = {{ result_limit }};

let fusePromise = null;

async function inflateNative(buffer) {
  const stream = new Blob([buffer]).stream().pipeThrough(new DecompressionStream("gzip"));
  return await new Response(stream).text();
}

async function inflatePako(buffer) {
  const pako = await import("{{ pako_url }}");
  const api = pako.ungzip ? pako : pako.default;
  return api.ungzip(new Uint8Array(buffer), { to: "string" });
}

async function wordsFromSource(source) {
  const url = URL.createObjectURL(new Blob([source], { type: "text/javascript" }));
  try {
    const mod = await import(url);
    return mod.WORDS;
  } finally {
    URL.revokeObjectURL(url);
  }
}

async function loadWords() {
  try {
    const response = await fetch(DATA_GZ);
    if (!response.ok) {
      throw new Error(`gzip payload unavailable: ${response.status}`);
    }
    const buffer = await response.arrayBuffer();
    let source;
    if (typeof DecompressionStream === "function") {
      try {
        source = await inflateNative(buffer);
      } catch (err) {
        source = await inflatePako(buffer);
      }
    } else {
      source = await inflatePako(buffer);
    }
    return await wordsFromSource(source);
  } catch (err) {
    const mod = await import(DATA_PLAIN);
    return mod.WORDS;
  }
}

function getFuse() {
  if (!fusePromise) {
    fusePromise = loadWords().then((words) => new Fuse(words, {
      keys: [
        { name: "word", weight: 0.7 },
        { name: "preview", weight: 0.25 },
        { name: "grammar", weight: 0.05 },
      ],
      threshold: {{ threshold }},
      ignoreLocation: true,
      includeScore: true,
      minMatchCharLength: 1,
    }));
  }
  return fusePromise;
}

self.onmessage = async (event) => {
  const { id, query } = event.data || {};
  const text = (query || "").trim();
  if (!text) {
    self.postMessage({ id, results: [] });
    return;
  }
  try {
    const fuse = await getFuse();
    const results = fuse.search(text, { limit: RESULT_LIMIT }).map((hit) => ({
      word: hit.item.word,
      slug: hit.item.slug,
      grammar: hit.item.grammar,
      preview: hit.item.preview,
      score: hit.score,
    }));
    self.postMessage({ id, results });
  } catch (err) {
    self.postMessage({ id, results: [], error: String(err) });
  }
};
"#,
    ext = "txt",
    escape = "none"
)]
pub struct SearchWorkerTemplate<'a> {
    pub fuse_url: &'a str,
    pub pako_url: &'a str,
    pub data_file: &'a str,
    pub data_gz_file: &'a str,
    pub result_limit: usize,
    pub threshold: f64,
}

impl Default for SearchWorkerTemplate<'_> {
    fn default() -> Self {
        Self {
            fuse_url: FUSE_MODULE_URL,
            pako_url: PAKO_MODULE_URL,
            data_file: SEARCH_DATA_FILE,
            data_gz_file: SEARCH_DATA_GZ_FILE,
            result_limit: SEARCH_RESULT_LIMIT,
            threshold: SEARCH_THRESHOLD,
        }
    }
}

/// Landing page with the search box.
#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="ne">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ title }}</title>
    <style>
      body { font-family: "Noto Sans Devanagari", system-ui, sans-serif; margin: 0; background: #f4f4f4; color: #161616; }
      main { max-width: 48rem; margin: 0 auto; padding: 3rem 1rem; }
      h1 { font-size: 2.25rem; margin-bottom: 0.25rem; }
      .lede { color: #525252; margin-top: 0; }
      input[type="search"] { width: 100%; box-sizing: border-box; font-size: 1.25rem; padding: 0.75rem 1rem; border: 2px solid #0f62fe; border-radius: 0.25rem; }
      #status { color: #525252; min-height: 1.5rem; }
      #results { list-style: none; padding: 0; }
      #results li { background: #ffffff; margin-bottom: 0.5rem; padding: 0.75rem 1rem; border-left: 4px solid #0f62fe; }
      #results a { color: #0f62fe; font-size: 1.2rem; text-decoration: none; }
      .gram-tag { color: #6f6f6f; margin-left: 0.5rem; }
      .preview { margin: 0.25rem 0 0; color: #393939; }
    </style>
  </head>
  <body>
    <main>
      <h1>{{ title }}</h1>
      <p class="lede">{{ entry_count }} शब्दहरूमध्ये खोज्नुहोस्।</p>
      <input id="query" type="search" placeholder="{{ placeholder }}" autocomplete="off" autofocus />
      <p id="status"></p>
      <ul id="results"></ul>
    </main>
    <script type="module">
      const input = document.getElementById("query");
      const status = document.getElementById("status");
      const list = document.getElementById("results");
      let worker = null;
      let latestId = 0;

      function ensureWorker() {
        if (!worker) {
          worker = new Worker("./search-worker.js", { type: "module" });
          worker.onmessage = (event) => {
            const { id, results, error } = event.data;
            if (id !== latestId) {
              return;
            }
            renderResults(results || [], error);
          };
        }
        return worker;
      }

      function renderResults(results, error) {
        list.innerHTML = "";
        if (error) {
          status.textContent = "खोज असफल भयो।";
          return;
        }
        if (!results.length) {
          status.textContent = input.value.trim() ? "कुनै परिणाम भेटिएन।" : "";
          return;
        }
        status.textContent = `${results.length} परिणाम`;
        for (const item of results) {
          const row = document.createElement("li");
          const link = document.createElement("a");
          link.href = `./${item.slug}`;
          link.textContent = item.word;
          row.appendChild(link);
          if (item.grammar) {
            const tag = document.createElement("span");
            tag.className = "gram-tag";
            tag.textContent = `[${item.grammar}]`;
            row.appendChild(tag);
          }
          if (item.preview) {
            const preview = document.createElement("p");
            preview.className = "preview";
            preview.textContent = item.preview;
            row.appendChild(preview);
          }
          list.appendChild(row);
        }
      }

      input.addEventListener("input", () => {
        latestId += 1;
        ensureWorker().postMessage({ id: latestId, query: input.value });
      });
    </script>
  </body>
</html>
"#,
    ext = "html"
)]
pub struct IndexPageTemplate<'a> {
    pub title: &'a str,
    pub placeholder: &'a str,
    pub entry_count: usize,
}

impl IndexPageTemplate<'_> {
    pub fn new(entry_count: usize) -> Self {
        Self {
            title: "नेपाली शब्दकोश",
            placeholder: "शब्द खोज्नुहोस्…",
            entry_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_embeds_search_settings() {
        let script = SearchWorkerTemplate::default().render().expect("worker renders");
        assert!(script.starts_with(&format!("import Fuse from \"{FUSE_MODULE_URL}\";")));
        assert!(script.contains(PAKO_MODULE_URL));
        assert!(script.contains("const DATA_GZ = \"./search-data.js.gz\";"));
        assert!(script.contains("const RESULT_LIMIT = 20;"));
        assert!(script.contains("threshold: 0.3,"));
        assert!(script.contains("{ name: \"word\", weight: 0.7 }"));
        assert!(script.contains("DecompressionStream"));
    }

    #[test]
    fn index_page_shows_count_and_loads_worker() {
        let html = IndexPageTemplate::new(1234).render().expect("index renders");
        assert!(html.contains("<title>नेपाली शब्दकोश</title>"));
        assert!(html.contains("1234 शब्दहरूमध्ये"));
        assert!(html.contains("new Worker(\"./search-worker.js\""));
        assert!(html.contains("link.href = `./${item.slug}`;"));
    }
}
