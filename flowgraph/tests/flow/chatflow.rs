//! The assistant graph end to end: intent classification fans the input to
//! a chat branch or a todo sub-flow, both converging on the final reply.

use std::sync::Arc;

use flowgraph::{
    AnswerNode, AssignerNode, Branches, ClassifierNode, CompiledFlow, FlowGraph, LlmNode,
    MockLlm, SessionState, StateUpdate, SubFlowNode, END, START,
};

const LABELS: [&str; 3] = ["创建待办", "查询待办", "其它"];

/// Todo child: treat the whole input as the task and confirm creation.
fn todo_child() -> CompiledFlow {
    let mut graph = FlowGraph::new();
    graph.add_node("extract", Arc::new(AssignerNode::overwrite("input", "task_content")));
    graph.add_node(
        "expand",
        Arc::new(AnswerNode::new("已创建：{task_content}", "created_task")),
    );
    graph.add_edge(START, "extract");
    graph.add_edge("extract", "expand");
    graph.add_edge("expand", END);
    graph.compile().expect("child compiles")
}

/// intent → (chat | call_todo) → main_reply → END.
fn assistant_flow() -> CompiledFlow {
    let intent_llm = Arc::new(
        MockLlm::new("其它").on("买牛奶", "```json\n{\"category_name\": \"创建待办\"}\n```"),
    );
    let chat_llm = Arc::new(MockLlm::new("你好！").on("天气", "晴天，适合散步。"));

    let mut graph = FlowGraph::new();
    graph.add_node(
        "intent",
        Arc::new(ClassifierNode::new(intent_llm, "{input}", LABELS, "intent")),
    );
    graph.add_node("chat", Arc::new(LlmNode::new(chat_llm, "{input}", "chat_reply")));
    graph.add_node(
        "call_todo",
        Arc::new(
            SubFlowNode::new(todo_child(), "todo")
                .with_inputs(["input"])
                .with_outputs(["created_task"]),
        ),
    );
    graph.add_node("main_reply", Arc::new(AnswerNode::new("{chat_reply}", "final_answer")));
    graph.add_edge(START, "intent");
    graph.add_conditional_edge(
        "intent",
        |s| s.text_or("intent", ""),
        Branches::new().on("创建待办", "call_todo").otherwise("chat"),
    );
    graph.add_edge("chat", "main_reply");
    graph.add_edge("call_todo", "main_reply");
    graph.add_edge("main_reply", END);
    graph.compile().expect("flow compiles")
}

fn input(text: &str) -> SessionState {
    let mut state = SessionState::new();
    state.apply(StateUpdate::new().with("input", text));
    state
}

/// 今天天气怎么样 classifies 其它 and traverses intent → chat → main_reply;
/// no task key is ever written on this path.
#[tokio::test]
async fn weather_question_takes_chat_branch() {
    let flow = assistant_flow();
    let out = flow.invoke(input("今天天气怎么样"), None).await.unwrap();

    assert_eq!(out.text_or("intent", ""), "其它");
    assert_eq!(out.text_or("chat_reply", ""), "晴天，适合散步。");
    assert_eq!(out.text_or("final_answer", ""), "晴天，适合散步。");
    assert!(!out.contains("task_content"), "task keys untouched on chat path");
    assert!(!out.contains("created_task"));
}

/// A task-like input routes through the todo sub-flow; only the declared
/// child output lands in the parent.
#[tokio::test]
async fn task_input_takes_todo_branch() {
    let flow = assistant_flow();
    let out = flow.invoke(input("帮我记一下买牛奶"), None).await.unwrap();

    assert_eq!(out.text_or("intent", ""), "创建待办");
    assert_eq!(out.text_or("created_task", ""), "已创建：帮我记一下买牛奶");
    assert!(!out.contains("chat_reply"), "chat branch never ran");
    assert!(
        !out.contains("task_content"),
        "child-internal keys stay in the child"
    );
}
