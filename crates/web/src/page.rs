//! The single-page chat front end.

pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>ChatPPT</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 860px; margin: 2rem auto; padding: 0 1rem; color: #1f2a44; }
  h1 { font-size: 1.6rem; }
  #history { border: 1px solid #ccd; border-radius: 8px; height: 400px; overflow-y: auto; padding: 0.75rem; background: #fafbff; }
  .turn { margin: 0.4rem 0; padding: 0.5rem 0.75rem; border-radius: 8px; white-space: pre-wrap; max-width: 85%; }
  .user { background: #dfe8ff; margin-left: auto; }
  .assistant { background: #eee; }
  label { display: block; margin-top: 1rem; font-weight: 600; }
  textarea { width: 100%; box-sizing: border-box; font: inherit; padding: 0.5rem; }
  .actions { margin-top: 0.5rem; display: flex; gap: 0.5rem; }
  button { font: inherit; padding: 0.5rem 1.2rem; border-radius: 6px; border: 1px solid #4472c4; background: #4472c4; color: #fff; cursor: pointer; }
  button.secondary { background: #fff; color: #4472c4; }
  button:disabled { opacity: 0.6; cursor: wait; }
  pre { background: #f3f3f3; padding: 0.75rem; border-radius: 6px; }
</style>
</head>
<body>
<h1>ChatPPT</h1>

<div id="history" aria-label="Conversation history"></div>

<label for="input">Content</label>
<textarea id="input" rows="5" placeholder="Enter the content you want to turn into slides..."></textarea>

<div class="actions">
  <button id="generate">Generate deck</button>
  <button id="clear" class="secondary">Clear</button>
</div>

<h3>How to use</h3>
<ol>
  <li>Type the content for your deck in the box above.</li>
  <li>It is organised into an outline automatically: a title, one heading per topic, and bullet points.</li>
  <li>Press <em>Generate deck</em>.</li>
  <li>The deck is saved in the server's output directory and its path is shown above.</li>
</ol>

<h3>Example input</h3>
<pre>AI Basics

What is AI
- a branch of computer science
- builds systems that mimic human intelligence

Applications
- machine learning
- natural language processing
- computer vision</pre>

<script>
  let conversationState = null;
  const historyEl = document.getElementById("history");
  const input = document.getElementById("input");
  const generateBtn = document.getElementById("generate");
  const clearBtn = document.getElementById("clear");

  function render(history) {
    historyEl.replaceChildren();
    for (const turn of history) {
      const div = document.createElement("div");
      div.className = "turn " + turn.role;
      div.textContent = turn.text;
      historyEl.appendChild(div);
    }
    historyEl.scrollTop = historyEl.scrollHeight;
  }

  generateBtn.addEventListener("click", async () => {
    generateBtn.disabled = true;
    try {
      const response = await fetch("/api/generate", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify({ text: input.value, state: conversationState }),
      });
      if (!response.ok) {
        render([{ text: await response.text(), role: "assistant" }]);
        return;
      }
      const body = await response.json();
      conversationState = body.state;
      render(body.history);
    } catch (err) {
      render([{ text: String(err), role: "assistant" }]);
    } finally {
      generateBtn.disabled = false;
    }
  });

  clearBtn.addEventListener("click", async () => {
    const response = await fetch("/api/clear", { method: "POST" });
    const body = await response.json();
    render(body.history);
    input.value = body.text;
  });
</script>
</body>
</html>
"##;
